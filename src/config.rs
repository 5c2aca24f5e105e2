use clap::Parser;

/// Runtime settings, read from the environment (and `.env`) or the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "flowledger-api", version, about = "Expense and budget tracking API")]
pub struct Config {
	#[arg(long, env = "DATABASE_URL")]
	pub database_url: String,

	#[arg(long, env = "JWT_SECRET", hide_env_values = true)]
	pub jwt_secret: String,

	#[arg(long, env = "SOCKET_URL", default_value = "0.0.0.0:5000")]
	pub socket_url: String,

	/// Allowed CORS origin; any origin when unset.
	#[arg(long, env = "CLIENT_ORIGIN")]
	pub client_origin: Option<String>,

	/// Without a key the chatbot answers with a fixed notice.
	#[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
	pub gemini_api_key: Option<String>,

	#[arg(long, env = "GEMINI_MODEL", default_value = crate::constants::DEFAULT_ADVISOR_MODEL)]
	pub gemini_model: String,

	#[arg(long, env = "TOKEN_TTL_SECS", default_value_t = crate::constants::ONE_WEEK)]
	pub token_ttl_secs: usize,

	#[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
	pub bcrypt_cost: u32,

	#[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
	pub db_pool_size: u32,
}
