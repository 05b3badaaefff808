use axum::{extract::{FromRef, FromRequestParts}, http::{header, request::Parts}};

use crate::ApiError;

#[derive(Debug, Clone)]
pub enum Identity {
	Anonymous,
	User {
		id: i64,
		session: String,
	},
}

impl Identity {
	pub fn my_id(&self) -> Option<i64> {
		match self {
			Identity::User { id, .. } => Some(*id),
			Identity::Anonymous => None,
		}
	}

	/// user id, or unauthorized for anonymous requests
	pub fn required(&self) -> Result<i64, ApiError> {
		self.my_id().ok_or_else(ApiError::unauthorized)
	}

	pub fn session(&self) -> Option<&str> {
		match self {
			Identity::User { session, .. } => Some(session),
			Identity::Anonymous => None,
		}
	}
}

pub struct AuthIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthIdentity
where
	lokanala::Context: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let ctx = lokanala::Context::from_ref(state);

		let auth_header = parts
			.headers
			.get(header::AUTHORIZATION)
			.map(|v| v.to_str().unwrap_or(""))
			.unwrap_or("");

		let Some(secret) = auth_header.strip_prefix("Bearer ") else {
			return Ok(AuthIdentity(Identity::Anonymous));
		};

		match lokanala::model::session::Entity::find_valid(secret)
			.one(ctx.db())
			.await?
		{
			None => Err(ApiError::unauthorized()),
			Some(x) => Ok(AuthIdentity(Identity::User { id: x.user, session: x.secret })),
		}
	}
}
