use crate::models::ErrorResponse;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Failures coming out of a [`crate::repo::Store`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("record conflicts with an existing one")]
	Conflict,
	#[error("connection pool error: {0}")]
	Pool(#[from] r2d2::Error),
	#[error("query failed: {0}")]
	Query(DieselError),
}

impl From<DieselError> for StoreError {
	fn from(e: DieselError) -> Self {
		match e {
			DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::Conflict,
			other => StoreError::Query(other),
		}
	}
}

/// Everything a handler can answer with besides success. Rendered as
/// `{"message": ...}` with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),
	#[error("{0}")]
	Unauthorized(String),
	#[error("Not found")]
	NotFound,
	#[error("{0}")]
	Upstream(String),
	#[error("Internal server error")]
	Internal(String),
}

impl ApiError {
	pub fn bad_request(msg: impl Into<String>) -> Self {
		ApiError::BadRequest(msg.into())
	}
}

impl From<StoreError> for ApiError {
	fn from(e: StoreError) -> Self {
		ApiError::Internal(e.to_string())
	}
}

impl From<actix_web::error::BlockingError> for ApiError {
	fn from(e: actix_web::error::BlockingError) -> Self {
		ApiError::Internal(e.to_string())
	}
}

impl ResponseError for ApiError {
	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ApiError::NotFound => StatusCode::NOT_FOUND,
			ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		if let ApiError::Internal(detail) = self {
			log::error!("Internal error: {}", detail);
		}
		HttpResponse::build(self.status_code()).json(ErrorResponse { message: self.to_string() })
	}
}
