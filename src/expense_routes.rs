use crate::handler::{body_config, ExpenseHandler};
use actix_web::web;

const INVALID_EXPENSE: &str = "Invalid expense data";

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::resource("/api/expenses")
			.app_data(body_config(INVALID_EXPENSE))
			.route(web::get().to(ExpenseHandler::list_expenses_handler))
			.route(web::post().to(ExpenseHandler::create_expense_handler)),
	)
	.service(
		web::resource("/api/expenses/{id}")
			.app_data(body_config(INVALID_EXPENSE))
			.route(web::get().to(ExpenseHandler::get_expense_handler))
			.route(web::put().to(ExpenseHandler::update_expense_handler))
			.route(web::delete().to(ExpenseHandler::delete_expense_handler)),
	);
}
