
#[allow(async_fn_in_trait)]
pub trait AnyQuery {
	async fn any(self, db: &impl sea_orm::ConnectionTrait) -> Result<bool, sea_orm::DbErr>;
}

impl<T : sea_orm::EntityTrait> AnyQuery for sea_orm::Select<T> {
	async fn any(self, db: &impl sea_orm::ConnectionTrait) -> Result<bool, sea_orm::DbErr> {
		Ok(self.one(db).await?.is_some())
	}
}

pub trait LoggableError {
	fn info_failed(self, msg: &str);
	fn warn_failed(self, msg: &str);
	fn err_failed(self, msg: &str);
}

impl<T, E: std::error::Error> LoggableError for Result<T, E> {
	fn info_failed(self, msg: &str) {
		if let Err(e) = self {
			tracing::info!("{} : {}", msg, e);
		}
	}

	fn warn_failed(self, msg: &str) {
		if let Err(e) = self {
			tracing::warn!("{} : {}", msg, e);
		}
	}

	fn err_failed(self, msg: &str) {
		if let Err(e) = self {
			tracing::error!("{} : {}", msg, e);
		}
	}
}

/// round to a single decimal digit, the precision ratings are displayed with
pub fn round1(x: f64) -> f64 {
	(x * 10.0).round() / 10.0
}
