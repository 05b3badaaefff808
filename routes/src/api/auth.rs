use axum::{extract::State, http::StatusCode, Json};
use lokanala::{traits::{admin::Registration, Administrable}, Context};
use rand::Rng;

use crate::{builders::{self, Reply}, views::{AuthSuccess, UserView}, AuthIdentity};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginForm {
	email: String,
	password: String,
	push_token: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterForm {
	name: String,
	email: String,
	password: String,
	phone: Option<String>,
	push_token: Option<String>,
}

fn token() -> String {
	rand::rng()
		.sample_iter(&rand::distr::Alphanumeric)
		.take(128)
		.map(char::from)
		.collect()
}

pub async fn login(
	State(ctx): State<Context>,
	Json(login): Json<LoginForm>,
) -> crate::ApiResult<Json<Reply<AuthSuccess>>> {
	let session = ctx.open_session(&login.email, &login.password, token(), login.push_token).await?;
	Ok(builders::ok("logged in", AuthSuccess {
		token: session.secret,
		user: session.user,
		expires: session.expires,
	}))
}

pub async fn logout(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
) -> crate::ApiResult<Json<Reply<()>>> {
	let session = auth.session().ok_or_else(crate::ApiError::unauthorized)?;
	ctx.close_session(session).await?;
	Ok(builders::done("logged out"))
}

pub async fn register(
	State(ctx): State<Context>,
	Json(registration): Json<RegisterForm>,
) -> crate::ApiResult<(StatusCode, Json<Reply<UserView>>)> {
	if !ctx.cfg().security.allow_registration {
		return Err(crate::ApiError::forbidden());
	}

	let user = ctx.register_user(Registration {
		name: registration.name,
		email: registration.email,
		password: registration.password,
		phone: registration.phone,
		push_token: registration.push_token,
	}).await?;

	Ok(builders::created("registered", UserView::from(user)))
}

#[cfg(test)]
mod test {
	#[test]
	fn session_tokens_are_long_and_alphanumeric() {
		let a = super::token();
		let b = super::token();
		assert_eq!(a.len(), 128);
		assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(a, b);
	}
}
