mod advisor;
mod budget_routes;
mod config;
mod constants;
mod db;
mod error;
mod expense_routes;
mod formats;
mod handler;
mod midware;
mod models;
mod repo;
mod schema;
mod state;
mod summary;
mod summary_routes;
#[cfg(test)]
mod tests;
mod user_routes;
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use advisor::{Advisor, GeminiAdvisor};
use clap::Parser;
use env_logger::Env;
use error::ApiError;
use midware::jwt::{Authentication, JWT};
use repo::PgStore;
use state::AppState;
use std::sync::Arc;

/// Fallback body and query extractor settings plus every route. Resources
/// with their own body message override the JSON one. Authentication and
/// CORS are wrapped around this by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.app_data(handler::body_config("Invalid request body")).app_data(
		web::QueryConfig::default().error_handler(|err, req| {
			log::warn!("Rejected query string on {}: {}", req.path(), err);
			ApiError::bad_request("Invalid query string").into()
		}),
	);
	user_routes::init(cfg);
	expense_routes::init(cfg);
	budget_routes::init(cfg);
	summary_routes::init(cfg);
}

/// CORS policy for `origin`. Unset or `*` allows any origin.
pub fn cors(origin: Option<&str>) -> Cors {
	match origin.map(str::trim).filter(|o| !o.is_empty() && *o != "*") {
		Some(origin) => Cors::default().allowed_origin(origin),
		None => Cors::default().allow_any_origin(),
	}
	.allow_any_method()
	.allow_any_header()
	.supports_credentials()
	.max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();
	env_logger::init_from_env(Env::default().default_filter_or("info"));
	let config = config::Config::parse();

	let pool = db::get_db_pool(&config.database_url, config.db_pool_size)?;
	db::init(&pool)?;

	let advisor: Option<Arc<dyn Advisor>> =
		match config.gemini_api_key.clone().filter(|key| !key.trim().is_empty()) {
			Some(key) => Some(Arc::new(GeminiAdvisor::new(key, config.gemini_model.clone())?)),
			None => {
				log::warn!("GEMINI_API_KEY not set, chatbot will answer with a fixed notice");
				None
			},
		};

	let jwt = Arc::new(JWT::new(&config.jwt_secret, config.token_ttl_secs));
	let state = web::Data::new(AppState {
		store: Arc::new(PgStore::new(pool)),
		jwt: jwt.clone(),
		advisor,
		bcrypt_cost: config.bcrypt_cost,
	});
	let client_origin = config.client_origin.clone();

	log::info!("Listening on: {}..", config.socket_url);

	HttpServer::new(move || {
		App::new()
			.app_data(state.clone())
			.wrap(Authentication::new(jwt.clone()))
			.wrap(cors(client_origin.as_deref()))
			.wrap(Logger::default())
			.configure(configure)
	})
	.bind(&config.socket_url)?
	.run()
	.await?;

	Ok(())
}
