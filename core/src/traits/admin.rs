use sea_orm::{sea_query::Expr, ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, EntityTrait, QueryFilter};

use crate::{errors::{ServiceError, ServiceResult}, ext::AnyQuery, model};

#[derive(Debug, Clone, Default)]
pub struct Registration {
	pub name: String,
	pub email: String,
	pub password: String,
	pub phone: Option<String>,
	pub push_token: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait Administrable {
	async fn register_user(&self, registration: Registration) -> ServiceResult<model::user::Model>;
	/// check credentials and open a session with the given secret
	async fn open_session(&self, email: &str, password: &str, secret: String, push_token: Option<String>) -> ServiceResult<model::session::Model>;
	/// close a session and forget the device token bound to it
	async fn close_session(&self, secret: &str) -> ServiceResult<()>;
	async fn set_push_token(&self, user: i64, token: Option<String>) -> ServiceResult<()>;
	async fn add_merchant_category(&self, name: &str) -> ServiceResult<model::merchant_category::Model>;
	async fn purge_sessions(&self) -> ServiceResult<u64>;
}

impl Administrable for crate::Context {
	async fn register_user(&self, registration: Registration) -> ServiceResult<model::user::Model> {
		let email = registration.email.trim().to_lowercase();
		if email.is_empty() || !email.contains('@') {
			return Err(ServiceError::invalid("a valid email is required"));
		}
		let name = registration.name.trim();
		if name.is_empty() {
			return Err(ServiceError::invalid("name can't be empty"));
		}
		let min = self.cfg().security.min_password_length;
		if registration.password.chars().count() < min {
			return Err(ServiceError::invalid(format!("password must be at least {min} characters")));
		}

		if model::user::Entity::find_by_email(&email).any(self.db()).await? {
			return Err(ServiceError::conflict("email already registered"));
		}

		let user = model::user::ActiveModel {
			id: NotSet,
			name: Set(name.to_string()),
			email: Set(email),
			password: Set(sha256::digest(registration.password)),
			phone: Set(registration.phone),
			photo: Set(None),
			push_token: Set(registration.push_token),
			created: Set(chrono::Utc::now()),
		}
			.insert(self.db())
			.await
			.map_err(|e| ServiceError::on_insert(e, "email already registered"))?;

		tracing::info!("registered user #{}", user.id);
		Ok(user)
	}

	async fn open_session(&self, email: &str, password: &str, secret: String, push_token: Option<String>) -> ServiceResult<model::session::Model> {
		let user = model::user::Entity::find_by_email(&email.trim().to_lowercase())
			.filter(model::user::Column::Password.eq(sha256::digest(password)))
			.one(self.db())
			.await?
			.ok_or(ServiceError::Unauthorized)?;

		if let Some(token) = push_token.filter(|t| !t.is_empty()) {
			self.set_push_token(user.id, Some(token)).await?;
		}

		let expires = chrono::Utc::now() + chrono::Duration::hours(self.cfg().security.session_duration_hours);
		Ok(
			model::session::ActiveModel {
				id: NotSet,
				user: Set(user.id),
				secret: Set(secret),
				expires: Set(expires),
			}
				.insert(self.db())
				.await?
		)
	}

	async fn close_session(&self, secret: &str) -> ServiceResult<()> {
		let session = model::session::Entity::find()
			.filter(model::session::Column::Secret.eq(secret))
			.one(self.db())
			.await?
			.ok_or(ServiceError::Unauthorized)?;

		model::session::Entity::delete_by_id(session.id)
			.exec(self.db())
			.await?;
		self.set_push_token(session.user, None).await?;
		Ok(())
	}

	async fn set_push_token(&self, user: i64, token: Option<String>) -> ServiceResult<()> {
		let res = model::user::Entity::update_many()
			.col_expr(model::user::Column::PushToken, Expr::value(token))
			.filter(model::user::Column::Id.eq(user))
			.exec(self.db())
			.await?;
		if res.rows_affected == 0 {
			return Err(ServiceError::NotFound("user"));
		}
		Ok(())
	}

	async fn add_merchant_category(&self, name: &str) -> ServiceResult<model::merchant_category::Model> {
		let name = name.trim();
		if name.is_empty() {
			return Err(ServiceError::invalid("category name can't be empty"));
		}
		Ok(
			model::merchant_category::ActiveModel {
				id: NotSet,
				name: Set(name.to_string()),
			}
				.insert(self.db())
				.await
				.map_err(|e| ServiceError::on_insert(e, "merchant category already exists"))?
		)
	}

	async fn purge_sessions(&self) -> ServiceResult<u64> {
		let res = model::session::Entity::delete_many()
			.filter(model::session::Column::Expires.lt(chrono::Utc::now()))
			.exec(self.db())
			.await?;
		Ok(res.rows_affected)
	}
}

#[cfg(test)]
mod test {
	use super::{Administrable, Registration};
	use crate::{errors::ServiceError, model, testing};

	fn registration(email: &str) -> Registration {
		Registration {
			name: "Siti".into(),
			email: email.into(),
			password: "rahasia123".into(),
			phone: None,
			push_token: None,
		}
	}

	#[tokio::test]
	async fn emails_are_unique() {
		let (ctx, _) = testing::context().await;
		ctx.register_user(registration("siti@example.com")).await.unwrap();
		let again = ctx.register_user(registration("SITI@example.com")).await;
		assert!(matches!(again, Err(ServiceError::Conflict(_))));

		let short = Registration { password: "123".into(), ..registration("other@example.com") };
		assert!(matches!(ctx.register_user(short).await, Err(ServiceError::Validation(_))));
	}

	#[tokio::test]
	async fn sessions_bind_and_release_push_tokens() {
		let (ctx, _) = testing::context().await;
		let user = ctx.register_user(registration("siti@example.com")).await.unwrap();

		let wrong = ctx.open_session("siti@example.com", "nope", "secret".into(), None).await;
		assert!(matches!(wrong, Err(ServiceError::Unauthorized)));

		let session = ctx.open_session("siti@example.com", "rahasia123", "secret".into(), Some("device".into())).await.unwrap();
		assert_eq!(session.user, user.id);
		assert_eq!(model::user::Entity::push_token_of(user.id, ctx.db()).await.unwrap().as_deref(), Some("device"));

		ctx.close_session("secret").await.unwrap();
		assert_eq!(model::user::Entity::push_token_of(user.id, ctx.db()).await.unwrap(), None);
		assert!(matches!(ctx.close_session("secret").await, Err(ServiceError::Unauthorized)));
		assert_eq!(ctx.purge_sessions().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn merchant_categories_are_unique() {
		let (ctx, _) = testing::context().await;
		ctx.add_merchant_category("food").await.unwrap();
		assert!(matches!(ctx.add_merchant_category("food").await, Err(ServiceError::Conflict(_))));
	}
}
