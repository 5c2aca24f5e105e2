pub const ONE_WEEK: usize = 604_800; // seconds

pub const MESSAGE_INVALID_TOKEN: &str = "Invalid or missing token";
pub const MESSAGE_INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Path prefixes reachable without a bearer token.
pub const IGNORE_ROUTES: [&str; 2] = ["/api/health", "/api/auth/"];

pub const DEFAULT_ADVISOR_MODEL: &str = "gemini-2.5-flash";
pub const ADVISOR_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const ADVISOR_TIMEOUT_SECS: u64 = 30;
pub const ADVISOR_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const ADVISOR_NOT_CONFIGURED: &str =
	"AI is not configured. Ask your admin to set GEMINI_API_KEY.";
pub const ADVISOR_FAILED: &str = "Failed to get a response from the AI.";
pub const RECENT_EXPENSES_FOR_ADVISOR: i64 = 10;
