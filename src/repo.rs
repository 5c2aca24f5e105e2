use crate::{
	db::DbPool,
	error::StoreError,
	models::{
		Budget, BudgetChanges, Category, CategoryTotal, Expense, ExpenseChanges, NewBudget,
		NewExpense, NewUser, User,
	},
	schema::{budgets, expenses, users},
	summary::DateWindow,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::{dsl::sum, prelude::*, upsert::excluded};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Clone)]
pub struct ExpenseFilter {
	pub category: Option<Category>,
	pub start: Option<NaiveDate>,
	pub end: Option<NaiveDate>,
	pub limit: Option<i64>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BudgetFilter {
	pub month: Option<i32>,
	pub year: Option<i32>,
}

/// Persistence for users, expenses and budgets.
///
/// Every expense and budget method takes the owner explicitly and only ever
/// sees that owner's rows: a row owned by someone else behaves exactly like
/// a missing one.
pub trait Store: Send + Sync {
	/// Fails with [`StoreError::Conflict`] when the email is taken.
	fn create_user(&self, user: NewUser) -> StoreResult<User>;
	fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

	fn create_expense(&self, expense: NewExpense) -> StoreResult<Expense>;
	/// Newest `expense_date` first.
	fn list_expenses(&self, owner: Uuid, filter: &ExpenseFilter) -> StoreResult<Vec<Expense>>;
	fn find_expense(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Expense>>;
	fn update_expense(
		&self,
		owner: Uuid,
		id: Uuid,
		changes: ExpenseChanges,
	) -> StoreResult<Option<Expense>>;
	fn delete_expense(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;
	/// Sum of amounts per category for expenses dated inside `window`.
	fn category_totals(&self, owner: Uuid, window: DateWindow) -> StoreResult<Vec<CategoryTotal>>;

	/// Create-or-replace keyed on (owner, category, month, year). An existing
	/// row keeps its id and takes the new limit.
	fn upsert_budget(&self, budget: NewBudget) -> StoreResult<Budget>;
	fn list_budgets(&self, owner: Uuid, filter: BudgetFilter) -> StoreResult<Vec<Budget>>;
	/// Fails with [`StoreError::Conflict`] when the change would duplicate
	/// another budget's natural key.
	fn update_budget(
		&self,
		owner: Uuid,
		id: Uuid,
		changes: BudgetChanges,
	) -> StoreResult<Option<Budget>>;
	fn delete_budget(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;
}

pub struct PgStore {
	pool: DbPool,
}

impl PgStore {
	pub fn new(pool: DbPool) -> Self {
		Self { pool }
	}
}

impl Store for PgStore {
	fn create_user(&self, user: NewUser) -> StoreResult<User> {
		let mut conn = self.pool.get()?;
		let user = diesel::insert_into(users::table)
			.values(&user)
			.returning(User::as_returning())
			.get_result(&mut conn)?;
		Ok(user)
	}

	fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
		let mut conn = self.pool.get()?;
		let user = users::table
			.filter(users::email.eq(email))
			.select(User::as_select())
			.first(&mut conn)
			.optional()?;
		Ok(user)
	}

	fn create_expense(&self, expense: NewExpense) -> StoreResult<Expense> {
		let mut conn = self.pool.get()?;
		let expense = diesel::insert_into(expenses::table)
			.values(&expense)
			.returning(Expense::as_returning())
			.get_result(&mut conn)?;
		Ok(expense)
	}

	fn list_expenses(&self, owner: Uuid, filter: &ExpenseFilter) -> StoreResult<Vec<Expense>> {
		let mut conn = self.pool.get()?;
		let mut query = expenses::table
			.filter(expenses::user_id.eq(owner))
			.select(Expense::as_select())
			.into_boxed();
		if let Some(category) = filter.category {
			query = query.filter(expenses::category.eq(category));
		}
		if let Some(start) = filter.start {
			query = query.filter(expenses::expense_date.ge(start));
		}
		if let Some(end) = filter.end {
			query = query.filter(expenses::expense_date.le(end));
		}
		if let Some(limit) = filter.limit {
			query = query.limit(limit);
		}
		let items = query
			.order((expenses::expense_date.desc(), expenses::created_at.desc()))
			.load(&mut conn)?;
		Ok(items)
	}

	fn find_expense(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Expense>> {
		let mut conn = self.pool.get()?;
		let item = expenses::table
			.filter(expenses::id.eq(id))
			.filter(expenses::user_id.eq(owner))
			.select(Expense::as_select())
			.first(&mut conn)
			.optional()?;
		Ok(item)
	}

	fn update_expense(
		&self,
		owner: Uuid,
		id: Uuid,
		changes: ExpenseChanges,
	) -> StoreResult<Option<Expense>> {
		let mut conn = self.pool.get()?;
		let updated = diesel::update(
			expenses::table.filter(expenses::id.eq(id)).filter(expenses::user_id.eq(owner)),
		)
		.set(&changes)
		.returning(Expense::as_returning())
		.get_result(&mut conn)
		.optional()?;
		Ok(updated)
	}

	fn delete_expense(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
		let mut conn = self.pool.get()?;
		let deleted = diesel::delete(
			expenses::table.filter(expenses::id.eq(id)).filter(expenses::user_id.eq(owner)),
		)
		.execute(&mut conn)?;
		Ok(deleted > 0)
	}

	fn category_totals(&self, owner: Uuid, window: DateWindow) -> StoreResult<Vec<CategoryTotal>> {
		let mut conn = self.pool.get()?;
		let rows = expenses::table
			.filter(expenses::user_id.eq(owner))
			.filter(expenses::expense_date.between(window.start, window.end))
			.group_by(expenses::category)
			.select((expenses::category, sum(expenses::amount)))
			.load::<(Category, Option<BigDecimal>)>(&mut conn)?;
		Ok(rows
			.into_iter()
			.map(|(category, total)| CategoryTotal {
				category,
				total: total.unwrap_or_else(|| BigDecimal::from(0)),
			})
			.collect())
	}

	fn upsert_budget(&self, budget: NewBudget) -> StoreResult<Budget> {
		let mut conn = self.pool.get()?;
		let stored = diesel::insert_into(budgets::table)
			.values(&budget)
			.on_conflict((budgets::user_id, budgets::category, budgets::month, budgets::year))
			.do_update()
			.set((
				budgets::limit_amount.eq(excluded(budgets::limit_amount)),
				budgets::updated_at.eq(excluded(budgets::updated_at)),
			))
			.returning(Budget::as_returning())
			.get_result(&mut conn)?;
		Ok(stored)
	}

	fn list_budgets(&self, owner: Uuid, filter: BudgetFilter) -> StoreResult<Vec<Budget>> {
		let mut conn = self.pool.get()?;
		let mut query = budgets::table
			.filter(budgets::user_id.eq(owner))
			.select(Budget::as_select())
			.into_boxed();
		if let Some(month) = filter.month {
			query = query.filter(budgets::month.eq(month));
		}
		if let Some(year) = filter.year {
			query = query.filter(budgets::year.eq(year));
		}
		let items = query
			.order((budgets::year.desc(), budgets::month.desc(), budgets::category.asc()))
			.load(&mut conn)?;
		Ok(items)
	}

	fn update_budget(
		&self,
		owner: Uuid,
		id: Uuid,
		changes: BudgetChanges,
	) -> StoreResult<Option<Budget>> {
		let mut conn = self.pool.get()?;
		let updated = diesel::update(
			budgets::table.filter(budgets::id.eq(id)).filter(budgets::user_id.eq(owner)),
		)
		.set(&changes)
		.returning(Budget::as_returning())
		.get_result(&mut conn)
		.optional()?;
		Ok(updated)
	}

	fn delete_budget(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
		let mut conn = self.pool.get()?;
		let deleted = diesel::delete(
			budgets::table.filter(budgets::id.eq(id)).filter(budgets::user_id.eq(owner)),
		)
		.execute(&mut conn)?;
		Ok(deleted > 0)
	}
}
