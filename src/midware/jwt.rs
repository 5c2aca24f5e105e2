use crate::{
	constants::{IGNORE_ROUTES, MESSAGE_INVALID_TOKEN},
	error::ApiError,
	models::ErrorResponse,
};
use actix_service::forward_ready;
use actix_web::{
	body::EitherBody,
	dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
	http::{header::Header, Method},
	Error as AxError, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::Utc;
use futures::future::{ok, ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub iat: usize,
	pub exp: usize,
	pub sub: String,
}

/// Signs and checks HS256 tokens carrying a user id.
pub struct JWT {
	secret: String,
	ttl_secs: usize,
}

impl JWT {
	pub fn new(s: &str, ttl_secs: usize) -> Self {
		Self { secret: s.to_string(), ttl_secs }
	}

	pub fn create_jwt(&self, user_id: Uuid) -> Result<String, Error> {
		let now = Utc::now().timestamp().max(0) as usize;
		let claims = Claims { iat: now, exp: now + self.ttl_secs, sub: user_id.to_string() };
		encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.secret.as_ref()))
	}

	pub fn verify_jwt(&self, token: &str) -> Result<Claims, Error> {
		decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_ref()), &Validation::default())
			.map(|data| data.claims)
	}
}

/// Rejects any request outside [`IGNORE_ROUTES`] that lacks a valid bearer
/// token, and hands the decoded [`Claims`] to the handler otherwise.
#[derive(Clone)]
pub struct Authentication {
	jwt: Arc<JWT>,
}

impl Authentication {
	pub fn new(jwt: Arc<JWT>) -> Self {
		Self { jwt }
	}
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type InitError = ();
	type Transform = AuthenticationMiddleware<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ok(AuthenticationMiddleware { jwt: self.jwt.clone(), service })
	}
}

pub struct AuthenticationMiddleware<S> {
	jwt: Arc<JWT>,
	service: S,
}

impl<S> AuthenticationMiddleware<S> {
	fn bypasses(req: &ServiceRequest) -> bool {
		Method::OPTIONS == *req.method() ||
			IGNORE_ROUTES.iter().any(|route| req.path().starts_with(route))
	}

	fn claims(&self, req: &ServiceRequest) -> Option<Claims> {
		let auth = Authorization::<Bearer>::parse(req).ok()?;
		match self.jwt.verify_jwt(auth.into_scheme().token()) {
			Ok(claims) => Some(claims),
			Err(e) => {
				warn!("Invalid token on {}: {}", req.path(), e);
				None
			},
		}
	}
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		debug!("## Req: {}", req.path());

		if !Self::bypasses(&req) {
			match self.claims(&req) {
				Some(claims) => {
					req.extensions_mut().insert(claims);
				},
				None => {
					let response = HttpResponse::Unauthorized()
						.json(ErrorResponse { message: MESSAGE_INVALID_TOKEN.to_string() });
					let response = req.into_response(response).map_into_right_body();
					return Box::pin(async { Ok(response) });
				},
			}
		}

		let res = self.service.call(req);

		Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
	}
}

/// The caller, as established by [`Authentication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
	pub id: Uuid,
}

impl FromRequest for AuthUser {
	type Error = ApiError;
	type Future = Ready<Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
		let id = req.extensions().get::<Claims>().and_then(|claims| Uuid::parse_str(&claims.sub).ok());
		ready(
			id.map(|id| AuthUser { id })
				.ok_or_else(|| ApiError::Unauthorized(MESSAGE_INVALID_TOKEN.to_string())),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_round_trips_the_user_id() {
		let jwt = JWT::new("test_secret", 60);
		let user = Uuid::new_v4();

		let token = jwt.create_jwt(user).unwrap();
		let claims = jwt.verify_jwt(&token).unwrap();

		assert_eq!(claims.sub, user.to_string());
		assert_eq!(claims.exp - claims.iat, 60);
	}

	#[test]
	fn token_from_another_secret_is_rejected() {
		let token = JWT::new("one", 60).create_jwt(Uuid::new_v4()).unwrap();
		assert!(JWT::new("two", 60).verify_jwt(&token).is_err());
	}

	#[test]
	fn expired_token_is_rejected() {
		let now = Utc::now().timestamp() as usize;
		let claims = Claims { iat: now - 7200, exp: now - 3600, sub: Uuid::new_v4().to_string() };
		let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap();
		assert!(JWT::new("k", 60).verify_jwt(&token).is_err());
	}
}
