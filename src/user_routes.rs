use crate::handler::{health_handler, UserHandler};
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg
		// open routes, skipped by the bearer check
		.route("/api/health", web::get().to(health_handler))
		.route("/api/auth/register", web::post().to(UserHandler::register_handler))
		.route("/api/auth/login", web::post().to(UserHandler::login_handler));
}
