use crate::{
	formats::{money, Amount, CalendarDate},
	schema::*,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{
	deserialize::{self, FromSql, FromSqlRow},
	expression::AsExpression,
	pg::{Pg, PgValue},
	prelude::*,
	serialize::{self, IsNull, Output, ToSql},
	sql_types::Text,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};
use validator::Validate;

/// Closed set of labels an expense or budget can be filed under.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
	AsExpression,
	FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum Category {
	Food,
	Transport,
	Entertainment,
	Utilities,
	Shopping,
	Health,
	Other,
}

impl Category {
	pub const ALL: [Category; 7] = [
		Category::Food,
		Category::Transport,
		Category::Entertainment,
		Category::Utilities,
		Category::Shopping,
		Category::Health,
		Category::Other,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Category::Food => "Food",
			Category::Transport => "Transport",
			Category::Entertainment => "Entertainment",
			Category::Utilities => "Utilities",
			Category::Shopping => "Shopping",
			Category::Health => "Health",
			Category::Other => "Other",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
	type Err = UnknownCategory;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Category::ALL
			.into_iter()
			.find(|c| c.as_str() == s)
			.ok_or_else(|| UnknownCategory(s.to_string()))
	}
}

impl ToSql<Text, Pg> for Category {
	fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
		out.write_all(self.as_str().as_bytes())?;
		Ok(IsNull::No)
	}
}

impl FromSql<Text, Pg> for Category {
	fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
		let raw = std::str::from_utf8(bytes.as_bytes())?;
		Ok(raw.parse()?)
	}
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
	pub id: uuid::Uuid,
	pub username: Option<String>,
	pub email: String,
	#[serde(skip_serializing)]
	pub password: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
	pub id: uuid::Uuid,
	pub username: Option<String>,
	pub email: String,
	pub password: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicUser {
	pub id: uuid::Uuid,
	pub username: Option<String>,
	pub email: String,
}

impl From<&User> for PublicUser {
	fn from(user: &User) -> Self {
		Self { id: user.id, username: user.username.clone(), email: user.email.clone() }
	}
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
	#[validate(length(max = 50))]
	pub username: Option<String>,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 6))]
	pub password: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct LoginRequest {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1))]
	pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResp {
	pub token: String,
	pub user: PublicUser,
}

#[derive(Debug, Serialize, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
	#[serde(rename = "_id")]
	pub id: uuid::Uuid,
	pub user_id: uuid::Uuid,
	#[serde(serialize_with = "money")]
	pub amount: BigDecimal,
	pub category: Category,
	pub description: String,
	#[serde(rename = "date")]
	pub expense_date: NaiveDate,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = expenses)]
pub struct NewExpense {
	pub id: uuid::Uuid,
	pub user_id: uuid::Uuid,
	pub amount: BigDecimal,
	pub category: Category,
	pub description: String,
	pub expense_date: NaiveDate,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = expenses)]
pub struct ExpenseChanges {
	pub amount: Option<BigDecimal>,
	pub category: Option<Category>,
	pub description: Option<String>,
	pub expense_date: Option<NaiveDate>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
	pub amount: Amount,
	pub category: Category,
	#[serde(default)]
	pub description: Option<String>,
	pub date: CalendarDate,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExpenseUpdateRequest {
	#[serde(default)]
	pub amount: Option<Amount>,
	#[serde(default)]
	pub category: Option<Category>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub date: Option<CalendarDate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
	pub category: Option<String>,
	pub start_date: Option<String>,
	pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Budget {
	#[serde(rename = "_id")]
	pub id: uuid::Uuid,
	pub user_id: uuid::Uuid,
	pub category: Category,
	#[serde(serialize_with = "money")]
	pub limit_amount: BigDecimal,
	pub month: i32,
	pub year: i32,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = budgets)]
pub struct NewBudget {
	pub id: uuid::Uuid,
	pub user_id: uuid::Uuid,
	pub category: Category,
	pub limit_amount: BigDecimal,
	pub month: i32,
	pub year: i32,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = budgets)]
pub struct BudgetChanges {
	pub category: Option<Category>,
	pub limit_amount: Option<BigDecimal>,
	pub month: Option<i32>,
	pub year: Option<i32>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
	pub category: Category,
	pub limit_amount: Amount,
	#[serde(default)]
	pub month: Option<i32>,
	#[serde(default)]
	pub year: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdateRequest {
	#[serde(default)]
	pub category: Option<Category>,
	#[serde(default)]
	pub limit_amount: Option<Amount>,
	#[serde(default)]
	pub month: Option<i32>,
	#[serde(default)]
	pub year: Option<i32>,
}

/// `?month=&year=` as used by budgets, dashboard and summary. Kept as raw
/// strings so that empty values fall back to the current period.
#[derive(Debug, Deserialize, Default)]
pub struct PeriodQuery {
	pub month: Option<String>,
	pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
	pub category: Category,
	pub total: BigDecimal,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BudgetVsActualItem {
	pub category: Category,
	#[serde(serialize_with = "money")]
	pub budget: BigDecimal,
	#[serde(serialize_with = "money")]
	pub actual: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct BudgetVsActual {
	pub month: u32,
	pub year: i32,
	pub items: Vec<BudgetVsActualItem>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardBreakdownItem {
	pub category: Category,
	#[serde(serialize_with = "money")]
	pub spent: BigDecimal,
	#[serde(serialize_with = "money")]
	pub budget: BigDecimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
	pub month: u32,
	pub year: i32,
	#[serde(serialize_with = "money")]
	pub total_spent: BigDecimal,
	pub breakdown: Vec<DashboardBreakdownItem>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
	pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatReply {
	pub reply: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuccessResponse {
	pub success: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
	pub message: String,
}
