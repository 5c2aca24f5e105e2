use crate::handler::{body_config, BudgetHandler};
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::resource("/api/budgets")
			.app_data(body_config("Invalid budget data"))
			.route(web::get().to(BudgetHandler::list_budgets_handler))
			.route(web::post().to(BudgetHandler::create_budget_handler)),
	)
	.service(
		web::resource("/api/budgets/{id}")
			.app_data(body_config("Invalid budget update"))
			.route(web::put().to(BudgetHandler::update_budget_handler))
			.route(web::delete().to(BudgetHandler::delete_budget_handler)),
	);
}
