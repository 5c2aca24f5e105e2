use crate::{
	advisor::build_prompt,
	constants::{
		ADVISOR_FAILED, ADVISOR_NOT_CONFIGURED, MESSAGE_INVALID_CREDENTIALS,
		RECENT_EXPENSES_FOR_ADVISOR,
	},
	error::{ApiError, StoreError},
	formats::parse_calendar_date,
	midware::jwt::AuthUser,
	models::{
		AuthResp, BudgetChanges, BudgetRequest, BudgetUpdateRequest, BudgetVsActual, Category,
		ChatReply, ChatRequest, Dashboard, ExpenseChanges, ExpenseQuery, ExpenseRequest,
		ExpenseUpdateRequest, LoginRequest, NewBudget, NewExpense, NewUser, PeriodQuery,
		PublicUser, RegisterRequest, SuccessResponse, User,
	},
	repo::{BudgetFilter, ExpenseFilter, Store, StoreResult},
	state::AppState,
	summary::{budget_vs_actual, dashboard_breakdown, parse_component, Period},
};
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

type HandlerResult = Result<HttpResponse, ApiError>;

/// Runs a store call on the blocking pool. The outer error is the pool
/// itself failing; the inner one is the store's answer.
async fn blocking<T, F>(state: &web::Data<AppState>, f: F) -> Result<StoreResult<T>, ApiError>
where
	T: Send + 'static,
	F: FnOnce(&dyn Store) -> StoreResult<T> + Send + 'static,
{
	let store = state.store.clone();
	Ok(web::block(move || f(store.as_ref())).await?)
}

/// Ids that do not parse cannot belong to the caller either.
fn record_id(path: web::Path<String>) -> Result<Uuid, ApiError> {
	Uuid::parse_str(&path.into_inner()).map_err(|_| ApiError::NotFound)
}

fn issue_token(state: &AppState, user: &User) -> Result<AuthResp, ApiError> {
	let token = state.jwt.create_jwt(user.id).map_err(|e| {
		log::error!("JWT creation error: {:?}", e);
		ApiError::Internal("Failed to create authentication token".to_string())
	})?;
	Ok(AuthResp { token, user: PublicUser::from(user) })
}

/// Body extractor settings for one resource. A body that does not
/// deserialize is answered with `message`; the parser's text only goes to the log.
pub fn body_config(message: &'static str) -> web::JsonConfig {
	web::JsonConfig::default().error_handler(move |err, req| {
		log::warn!("Rejected body on {}: {}", req.path(), err);
		ApiError::bad_request(message).into()
	})
}

pub async fn health_handler() -> HttpResponse {
	HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub struct UserHandler;

impl UserHandler {
	pub async fn register_handler(
		state: web::Data<AppState>,
		req: web::Json<RegisterRequest>,
	) -> HandlerResult {
		let req = req.into_inner();
		if let Err(e) = req.validate() {
			log::warn!("Registration validation error: {}", e);
			return Err(ApiError::BadRequest(e.to_string()));
		}

		let email = req.email.trim().to_lowercase();
		let username = req.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
		let cost = state.bcrypt_cost;
		let password = req.password;
		let hashed = web::block(move || bcrypt::hash(password, cost)).await?.map_err(|e| {
			log::error!("Password hashing failed: {}", e);
			ApiError::Internal("Failed to hash password".to_string())
		})?;

		let now = Utc::now();
		let new_user =
			NewUser { id: Uuid::new_v4(), username, email, password: hashed, created_at: now, updated_at: now };

		let user = match blocking(&state, move |store| store.create_user(new_user)).await? {
			Ok(user) => user,
			Err(StoreError::Conflict) => {
				log::info!("Registration refused, email already registered");
				return Err(ApiError::bad_request("User already exists"));
			},
			Err(e) => return Err(e.into()),
		};

		log::info!("Registered user {}", user.id);
		Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
	}

	pub async fn login_handler(
		state: web::Data<AppState>,
		req: web::Json<LoginRequest>,
	) -> HandlerResult {
		let req = req.into_inner();
		if req.validate().is_err() {
			return Err(ApiError::Unauthorized(MESSAGE_INVALID_CREDENTIALS.to_string()));
		}

		let email = req.email.trim().to_lowercase();
		let Some(user) = blocking(&state, move |store| store.find_user_by_email(&email)).await?? else {
			return Err(ApiError::Unauthorized(MESSAGE_INVALID_CREDENTIALS.to_string()));
		};

		let hash = user.password.clone();
		let password = req.password;
		let matches = web::block(move || bcrypt::verify(password, &hash)).await?.unwrap_or_else(|e| {
			log::error!("Stored password hash for {} unreadable: {}", user.id, e);
			false
		});
		if !matches {
			log::warn!("Failed login for user {}", user.id);
			return Err(ApiError::Unauthorized(MESSAGE_INVALID_CREDENTIALS.to_string()));
		}

		log::info!("Login successful for user {}", user.id);
		Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
	}
}

pub struct ExpenseHandler;

impl ExpenseHandler {
	pub async fn create_expense_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		req: web::Json<ExpenseRequest>,
	) -> HandlerResult {
		let req = req.into_inner();
		let Some(amount) = req.amount.non_negative() else {
			return Err(ApiError::bad_request("Invalid expense data"));
		};

		let now = Utc::now();
		let new_expense = NewExpense {
			id: Uuid::new_v4(),
			user_id: user.id,
			amount,
			category: req.category,
			description: req.description.unwrap_or_default().trim().to_string(),
			expense_date: req.date.0,
			created_at: now,
			updated_at: now,
		};

		let expense = blocking(&state, move |store| store.create_expense(new_expense)).await??;
		log::info!("Expense {} created for user {}", expense.id, user.id);
		Ok(HttpResponse::Created().json(expense))
	}

	pub async fn list_expenses_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		query: web::Query<ExpenseQuery>,
	) -> HandlerResult {
		let query = query.into_inner();
		let not_blank = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

		let category = match not_blank(&query.category) {
			Some(raw) => Some(
				raw.parse::<Category>().map_err(|e| ApiError::bad_request(e.to_string()))?,
			),
			None => None,
		};
		let start = match not_blank(&query.start_date) {
			Some(raw) => Some(
				parse_calendar_date(&raw).ok_or_else(|| ApiError::bad_request("Invalid startDate"))?,
			),
			None => None,
		};
		let end = match not_blank(&query.end_date) {
			Some(raw) => {
				Some(parse_calendar_date(&raw).ok_or_else(|| ApiError::bad_request("Invalid endDate"))?)
			},
			None => None,
		};

		let filter = ExpenseFilter { category, start, end, limit: None };
		let items = blocking(&state, move |store| store.list_expenses(user.id, &filter)).await??;
		log::info!("Listed {} expenses for user {}", items.len(), user.id);
		Ok(HttpResponse::Ok().json(items))
	}

	pub async fn get_expense_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		path: web::Path<String>,
	) -> HandlerResult {
		let id = record_id(path)?;
		let item = blocking(&state, move |store| store.find_expense(user.id, id))
			.await??
			.ok_or(ApiError::NotFound)?;
		Ok(HttpResponse::Ok().json(item))
	}

	pub async fn update_expense_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		path: web::Path<String>,
		req: web::Json<ExpenseUpdateRequest>,
	) -> HandlerResult {
		let id = record_id(path)?;
		let req = req.into_inner();
		let amount = match req.amount {
			Some(amount) => {
				Some(amount.non_negative().ok_or_else(|| ApiError::bad_request("Invalid expense data"))?)
			},
			None => None,
		};
		let changes = ExpenseChanges {
			amount,
			category: req.category,
			description: req.description.map(|d| d.trim().to_string()),
			expense_date: req.date.map(|d| d.0),
			updated_at: Utc::now(),
		};

		let updated = blocking(&state, move |store| store.update_expense(user.id, id, changes))
			.await??
			.ok_or(ApiError::NotFound)?;
		log::info!("Expense {} updated by user {}", id, user.id);
		Ok(HttpResponse::Ok().json(updated))
	}

	pub async fn delete_expense_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		path: web::Path<String>,
	) -> HandlerResult {
		let id = record_id(path)?;
		if !blocking(&state, move |store| store.delete_expense(user.id, id)).await?? {
			return Err(ApiError::NotFound);
		}
		log::info!("Expense {} deleted by user {}", id, user.id);
		Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
	}
}

pub struct BudgetHandler;

impl BudgetHandler {
	pub async fn create_budget_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		req: web::Json<BudgetRequest>,
	) -> HandlerResult {
		let req = req.into_inner();
		let invalid = || ApiError::bad_request("Invalid budget data");
		let today = Utc::now().date_naive();

		let limit_amount = req.limit_amount.non_negative().ok_or_else(invalid)?;
		let period = Period::new(
			req.month.map_or(today.month().into(), i64::from),
			req.year.map_or(today.year().into(), i64::from),
		)
		.map_err(|_| invalid())?;

		let now = Utc::now();
		let new_budget = NewBudget {
			id: Uuid::new_v4(),
			user_id: user.id,
			category: req.category,
			limit_amount,
			month: period.month as i32,
			year: period.year,
			created_at: now,
			updated_at: now,
		};

		let budget = blocking(&state, move |store| store.upsert_budget(new_budget)).await??;
		log::info!(
			"Budget {} stored for user {} ({} {}/{})",
			budget.id,
			user.id,
			budget.category,
			budget.month,
			budget.year
		);
		Ok(HttpResponse::Created().json(budget))
	}

	pub async fn list_budgets_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		query: web::Query<PeriodQuery>,
	) -> HandlerResult {
		let month = parse_component(query.month.as_deref(), "month")?;
		let year = parse_component(query.year.as_deref(), "year")?;
		let filter = BudgetFilter {
			month: month.map(i32::try_from).transpose().map_err(|_| ApiError::bad_request("Invalid month"))?,
			year: year.map(i32::try_from).transpose().map_err(|_| ApiError::bad_request("Invalid year"))?,
		};

		let items = blocking(&state, move |store| store.list_budgets(user.id, filter)).await??;
		Ok(HttpResponse::Ok().json(items))
	}

	pub async fn update_budget_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		path: web::Path<String>,
		req: web::Json<BudgetUpdateRequest>,
	) -> HandlerResult {
		let id = record_id(path)?;
		let req = req.into_inner();
		let invalid = || ApiError::bad_request("Invalid budget update");

		let limit_amount = match req.limit_amount {
			Some(amount) => Some(amount.non_negative().ok_or_else(invalid)?),
			None => None,
		};
		// 0 leaves the field as it is
		let month = req.month.filter(|m| *m != 0);
		let year = req.year.filter(|y| *y != 0);
		if month.is_some_and(|m| !(1..=12).contains(&m)) {
			return Err(invalid());
		}
		let changes = BudgetChanges {
			category: req.category,
			limit_amount,
			month,
			year,
			updated_at: Utc::now(),
		};

		let updated = match blocking(&state, move |store| store.update_budget(user.id, id, changes))
			.await?
		{
			Ok(Some(budget)) => budget,
			Ok(None) => return Err(ApiError::NotFound),
			Err(StoreError::Conflict) => return Err(invalid()),
			Err(e) => return Err(e.into()),
		};
		log::info!("Budget {} updated by user {}", id, user.id);
		Ok(HttpResponse::Ok().json(updated))
	}

	pub async fn delete_budget_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		path: web::Path<String>,
	) -> HandlerResult {
		let id = record_id(path)?;
		if !blocking(&state, move |store| store.delete_budget(user.id, id)).await?? {
			return Err(ApiError::NotFound);
		}
		log::info!("Budget {} deleted by user {}", id, user.id);
		Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
	}
}

pub struct SummaryHandler;

impl SummaryHandler {
	pub async fn budget_vs_actual_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		query: web::Query<PeriodQuery>,
	) -> HandlerResult {
		let period = Period::resolve(&query, Utc::now().date_naive())?;
		let window = period.window;

		let actuals = blocking(&state, move |store| store.category_totals(user.id, window)).await??;
		let filter = BudgetFilter { month: Some(period.month as i32), year: Some(period.year) };
		let budgets = blocking(&state, move |store| store.list_budgets(user.id, filter)).await??;

		Ok(HttpResponse::Ok().json(BudgetVsActual {
			month: period.month,
			year: period.year,
			items: budget_vs_actual(&actuals, &budgets),
		}))
	}

	pub async fn dashboard_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		query: web::Query<PeriodQuery>,
	) -> HandlerResult {
		let period = Period::resolve(&query, Utc::now().date_naive())?;
		let window = period.window;

		let actuals = blocking(&state, move |store| store.category_totals(user.id, window)).await??;
		let filter = BudgetFilter { month: Some(period.month as i32), year: Some(period.year) };
		let budgets = blocking(&state, move |store| store.list_budgets(user.id, filter)).await??;

		let (total_spent, breakdown) = dashboard_breakdown(&actuals, &budgets);
		Ok(HttpResponse::Ok().json(Dashboard {
			month: period.month,
			year: period.year,
			total_spent,
			breakdown,
		}))
	}
}

pub struct ChatbotHandler;

impl ChatbotHandler {
	pub async fn chat_handler(
		state: web::Data<AppState>,
		user: AuthUser,
		req: web::Json<ChatRequest>,
	) -> HandlerResult {
		let message = req.into_inner().message;
		if message.trim().is_empty() {
			return Err(ApiError::bad_request("Message is required"));
		}

		let Some(advisor) = state.advisor.clone() else {
			return Ok(HttpResponse::Ok().json(ChatReply { reply: ADVISOR_NOT_CONFIGURED.to_string() }));
		};

		let recent = ExpenseFilter { limit: Some(RECENT_EXPENSES_FOR_ADVISOR), ..Default::default() };
		let expenses = blocking(&state, move |store| store.list_expenses(user.id, &recent)).await??;
		let budgets =
			blocking(&state, move |store| store.list_budgets(user.id, BudgetFilter::default())).await??;

		let prompt = build_prompt(&expenses, &budgets, &message)
			.map_err(|e| ApiError::Internal(format!("failed to encode advisor context: {e}")))?;

		match advisor.generate(prompt).await {
			Ok(reply) => Ok(HttpResponse::Ok().json(ChatReply { reply })),
			Err(e) => {
				log::error!("Error with AI chat for user {}: {}", user.id, e);
				Err(ApiError::Upstream(ADVISOR_FAILED.to_string()))
			},
		}
	}
}
