use crate::{advisor::Advisor, midware::jwt::JWT, repo::Store};
use std::sync::Arc;

/// Shared, read-only handles every handler gets through `web::Data`.
pub struct AppState {
	pub store: Arc<dyn Store>,
	pub jwt: Arc<JWT>,
	/// `None` when no advisor key is configured.
	pub advisor: Option<Arc<dyn Advisor>>,
	pub bcrypt_cost: u32,
}
