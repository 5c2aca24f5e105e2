use crate::handler::{body_config, ChatbotHandler, SummaryHandler};
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.route("/api/dashboard", web::get().to(SummaryHandler::dashboard_handler))
		.route("/api/summary/budget-vs-actual", web::get().to(SummaryHandler::budget_vs_actual_handler))
		.service(
			web::resource("/api/chatbot")
				.app_data(body_config("Message is required"))
				.route(web::post().to(ChatbotHandler::chat_handler)),
		);
}
