//! Month-level derived views: budget vs actual, and the dashboard breakdown.
//!
//! Both views are computed from two separate reads (per-category expense
//! totals and the month's budgets). They are not taken in one transaction,
//! so a write landing between the reads can show up on one side only.

use crate::{
	error::ApiError,
	models::{Budget, BudgetVsActualItem, Category, CategoryTotal, DashboardBreakdownItem, PeriodQuery},
};
use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
	pub start: NaiveDate,
	pub end: NaiveDate,
}

impl DateWindow {
	/// First through last day of `month` in `year`.
	pub fn for_month(month: u32, year: i32) -> Option<Self> {
		let start = NaiveDate::from_ymd_opt(year, month, 1)?;
		let next_month = if month == 12 {
			NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
		} else {
			NaiveDate::from_ymd_opt(year, month + 1, 1)?
		};
		Some(Self { start, end: next_month.pred_opt()? })
	}

	pub fn contains(&self, day: NaiveDate) -> bool {
		self.start <= day && day <= self.end
	}
}

/// A validated (month, year) pair with its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
	pub month: u32,
	pub year: i32,
	pub window: DateWindow,
}

pub(crate) fn parse_component(raw: Option<&str>, name: &str) -> Result<Option<i64>, ApiError> {
	let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
		return Ok(None);
	};
	let value: i64 = raw.parse().map_err(|_| ApiError::bad_request(format!("Invalid {name}")))?;
	// 0 means "not given", same as an empty value
	Ok((value != 0).then_some(value))
}

impl Period {
	/// Resolves `?month=&year=`, falling back to `today`'s month and year for
	/// anything missing, empty or zero.
	pub fn resolve(query: &PeriodQuery, today: NaiveDate) -> Result<Self, ApiError> {
		let month = parse_component(query.month.as_deref(), "month")?.unwrap_or(today.month().into());
		let year = parse_component(query.year.as_deref(), "year")?.unwrap_or(today.year().into());
		Self::new(month, year)
	}

	pub fn new(month: i64, year: i64) -> Result<Self, ApiError> {
		if !(1..=12).contains(&month) {
			return Err(ApiError::bad_request("Month must be between 1 and 12"));
		}
		let year = i32::try_from(year).map_err(|_| ApiError::bad_request("Invalid year"))?;
		let month = month as u32;
		let window =
			DateWindow::for_month(month, year).ok_or_else(|| ApiError::bad_request("Invalid year"))?;
		Ok(Self { month, year, window })
	}
}

fn budget_for(budgets: &[Budget], category: Category) -> BigDecimal {
	budgets
		.iter()
		.find(|b| b.category == category)
		.map(|b| b.limit_amount.clone())
		.unwrap_or_else(|| BigDecimal::from(0))
}

fn actual_for(actuals: &[CategoryTotal], category: Category) -> BigDecimal {
	actuals
		.iter()
		.find(|a| a.category == category)
		.map(|a| a.total.clone())
		.unwrap_or_else(|| BigDecimal::from(0))
}

/// Union of spent and budgeted categories, each side defaulting to zero.
/// Spent categories come first, then budget-only ones.
pub fn budget_vs_actual(actuals: &[CategoryTotal], budgets: &[Budget]) -> Vec<BudgetVsActualItem> {
	let mut categories: Vec<Category> = Vec::with_capacity(Category::ALL.len());
	for category in actuals.iter().map(|a| a.category).chain(budgets.iter().map(|b| b.category)) {
		if !categories.contains(&category) {
			categories.push(category);
		}
	}

	categories
		.into_iter()
		.map(|category| BudgetVsActualItem {
			category,
			budget: budget_for(budgets, category),
			actual: actual_for(actuals, category),
		})
		.collect()
}

/// Total spend plus one row per spent category. Budget-only categories are
/// not listed here.
pub fn dashboard_breakdown(
	actuals: &[CategoryTotal],
	budgets: &[Budget],
) -> (BigDecimal, Vec<DashboardBreakdownItem>) {
	let total = actuals.iter().fold(BigDecimal::from(0), |acc, a| acc + &a.total);
	let breakdown = actuals
		.iter()
		.map(|a| DashboardBreakdownItem {
			category: a.category,
			spent: a.total.clone(),
			budget: budget_for(budgets, a.category),
		})
		.collect();
	(total, breakdown)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use std::{collections::HashSet, str::FromStr};

	fn day(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn total(category: Category, amount: &str) -> CategoryTotal {
		CategoryTotal { category, total: BigDecimal::from_str(amount).unwrap() }
	}

	fn budget(category: Category, limit: i64) -> Budget {
		let now = Utc::now();
		Budget {
			id: uuid::Uuid::new_v4(),
			user_id: uuid::Uuid::new_v4(),
			category,
			limit_amount: BigDecimal::from(limit),
			month: 3,
			year: 2024,
			created_at: now,
			updated_at: now,
		}
	}

	fn query(month: Option<&str>, year: Option<&str>) -> PeriodQuery {
		PeriodQuery { month: month.map(String::from), year: year.map(String::from) }
	}

	#[test]
	fn window_covers_whole_month_including_leap_day() {
		let feb = DateWindow::for_month(2, 2024).unwrap();
		assert_eq!(feb.start, day(2024, 2, 1));
		assert_eq!(feb.end, day(2024, 2, 29));

		let dec = DateWindow::for_month(12, 2023).unwrap();
		assert_eq!(dec.end, day(2023, 12, 31));
		assert!(dec.contains(day(2023, 12, 1)));
		assert!(dec.contains(day(2023, 12, 31)));
		assert!(!dec.contains(day(2024, 1, 1)));
		assert!(!dec.contains(day(2023, 11, 30)));
	}

	#[test]
	fn period_defaults_to_today_when_missing_empty_or_zero() {
		let today = day(2025, 7, 14);
		for q in [query(None, None), query(Some(""), Some("")), query(Some("0"), Some("0"))] {
			let period = Period::resolve(&q, today).unwrap();
			assert_eq!((period.month, period.year), (7, 2025));
		}

		let explicit = Period::resolve(&query(Some("3"), None), today).unwrap();
		assert_eq!((explicit.month, explicit.year), (3, 2025));
	}

	#[test]
	fn period_rejects_bad_month_and_garbage() {
		let today = day(2025, 7, 14);
		assert!(Period::resolve(&query(Some("13"), None), today).is_err());
		assert!(Period::resolve(&query(Some("-1"), None), today).is_err());
		assert!(Period::resolve(&query(Some("march"), None), today).is_err());
		assert!(Period::resolve(&query(None, Some("99999999999")), today).is_err());
	}

	#[test]
	fn budget_vs_actual_is_the_union_without_duplicates() {
		let actuals = vec![total(Category::Food, "320.5"), total(Category::Transport, "40")];
		let budgets = vec![budget(Category::Food, 5000), budget(Category::Health, 300)];

		let items = budget_vs_actual(&actuals, &budgets);
		let categories: HashSet<Category> = items.iter().map(|i| i.category).collect();

		assert_eq!(items.len(), 3);
		assert_eq!(
			categories,
			HashSet::from([Category::Food, Category::Transport, Category::Health])
		);

		let food = items.iter().find(|i| i.category == Category::Food).unwrap();
		assert_eq!(food.budget, BigDecimal::from(5000));
		assert_eq!(food.actual, BigDecimal::from_str("320.5").unwrap());

		let transport = items.iter().find(|i| i.category == Category::Transport).unwrap();
		assert_eq!(transport.budget, BigDecimal::from(0));

		let health = items.iter().find(|i| i.category == Category::Health).unwrap();
		assert_eq!(health.actual, BigDecimal::from(0));
	}

	#[test]
	fn budget_vs_actual_of_nothing_is_empty() {
		assert!(budget_vs_actual(&[], &[]).is_empty());
	}

	#[test]
	fn dashboard_lists_spent_categories_only() {
		let actuals = vec![total(Category::Food, "10.25"), total(Category::Shopping, "5")];
		let budgets = vec![budget(Category::Food, 100), budget(Category::Utilities, 80)];

		let (sum, breakdown) = dashboard_breakdown(&actuals, &budgets);

		assert_eq!(sum, BigDecimal::from_str("15.25").unwrap());
		assert_eq!(breakdown.len(), 2);
		assert!(breakdown.iter().all(|row| row.category != Category::Utilities));
		let food = breakdown.iter().find(|r| r.category == Category::Food).unwrap();
		assert_eq!(food.budget, BigDecimal::from(100));
	}
}
