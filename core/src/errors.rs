use sea_orm::{DbErr, SqlErr};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("database error: {0}")]
	Database(#[from] DbErr),

	#[error("storage error: {0}")]
	Storage(#[from] crate::storage::StorageError),

	#[error("{0}")]
	Validation(String),

	#[error("{0} not found")]
	NotFound(&'static str),

	#[error("{0}")]
	Conflict(String),

	#[error("not allowed to act on this resource")]
	Forbidden,

	#[error("invalid credentials")]
	Unauthorized,
}

impl ServiceError {
	pub fn invalid(msg: impl ToString) -> Self {
		Self::Validation(msg.to_string())
	}

	pub fn conflict(msg: impl ToString) -> Self {
		Self::Conflict(msg.to_string())
	}

	/// a unique index rejecting a write means someone got there first: surface it as a
	/// conflict rather than a database failure
	pub fn on_insert(err: DbErr, conflict: &str) -> Self {
		match err.sql_err() {
			Some(SqlErr::UniqueConstraintViolation(_)) => Self::conflict(conflict),
			_ => Self::Database(err),
		}
	}

	/// tag used in api error payloads
	pub fn kind(&self) -> &'static str {
		match self {
			ServiceError::Database(_) => "database",
			ServiceError::Storage(_) => "storage",
			ServiceError::Validation(_) => "validation",
			ServiceError::NotFound(_) => "not_found",
			ServiceError::Conflict(_) => "conflict",
			ServiceError::Forbidden => "forbidden",
			ServiceError::Unauthorized => "unauthorized",
		}
	}
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod test {
	use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}};

	use super::ServiceError;
	use crate::{model, testing};

	#[tokio::test]
	async fn unique_index_violations_become_conflicts() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let reviewer = testing::user(&ctx, "reviewer", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let product = testing::product(&ctx, merchant, "kopi").await;
		testing::review(&ctx, product, reviewer, 4).await;
		testing::follow(&ctx, reviewer, merchant).await;

		// same rows again, as a concurrent request passing the existence check would write them
		let review = model::review::ActiveModel {
			id: NotSet,
			product: Set(product),
			user: Set(reviewer),
			rating: Set(5),
			comment: Set(String::new()),
			photos: Set(None),
			published: Set(chrono::Utc::now()),
		}
			.insert(ctx.db())
			.await
			.map_err(|e| ServiceError::on_insert(e, "product already reviewed by this user"));
		assert!(matches!(review, Err(ServiceError::Conflict(ref msg)) if msg == "product already reviewed by this user"));

		let follow = model::follow::ActiveModel {
			id: NotSet,
			user: Set(reviewer),
			merchant: Set(merchant),
			created: Set(chrono::Utc::now()),
		}
			.insert(ctx.db())
			.await
			.map_err(|e| ServiceError::on_insert(e, "already following this merchant"));
		assert!(matches!(follow, Err(ServiceError::Conflict(_))));
	}

	#[test]
	fn other_database_errors_stay_database_errors() {
		let err = ServiceError::on_insert(sea_orm::DbErr::Custom("connection reset".into()), "dup");
		assert!(matches!(err, ServiceError::Database(_)));
	}
}
