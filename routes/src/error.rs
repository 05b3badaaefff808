use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("{0}")]
	Service(#[from] lokanala::Error),

	#[error("database error: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("invalid multipart body: {0}")]
	Multipart(#[from] axum::extract::multipart::MultipartError),

	#[error("{0}")]
	BadRequest(String),

	// wrapper error to return arbitraty status codes
	#[error("{0}")]
	Status(StatusCode),
}

impl ApiError {
	pub fn bad_request(msg: impl ToString) -> Self {
		Self::BadRequest(msg.to_string())
	}

	pub fn not_found() -> Self {
		Self::Status(StatusCode::NOT_FOUND)
	}

	pub fn forbidden() -> Self {
		Self::Status(StatusCode::FORBIDDEN)
	}

	pub fn unauthorized() -> Self {
		Self::Status(StatusCode::UNAUTHORIZED)
	}

	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::Service(e) => match e {
				lokanala::Error::Validation(_) => StatusCode::BAD_REQUEST,
				lokanala::Error::NotFound(_) => StatusCode::NOT_FOUND,
				lokanala::Error::Conflict(_) => StatusCode::CONFLICT,
				lokanala::Error::Forbidden => StatusCode::FORBIDDEN,
				lokanala::Error::Unauthorized => StatusCode::UNAUTHORIZED,
				lokanala::Error::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
				lokanala::Error::Storage(s) if s.is_rejection() => StatusCode::BAD_REQUEST,
				lokanala::Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
			},
			ApiError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::Multipart(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::Status(status) => *status,
		}
	}

	fn tag(&self) -> &'static str {
		match self {
			ApiError::Service(e) => e.kind(),
			ApiError::Database(_) => "database",
			ApiError::Multipart(_) => "multipart",
			ApiError::BadRequest(_) => "validation",
			ApiError::Status(_) => "status",
		}
	}
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<StatusCode> for ApiError {
	fn from(value: StatusCode) -> Self {
		ApiError::Status(value)
	}
}

impl From<lokanala::storage::StorageError> for ApiError {
	fn from(value: lokanala::storage::StorageError) -> Self {
		ApiError::Service(value.into())
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!("emitting error response: {self:?}");
		} else {
			tracing::debug!("emitting error response: {self:?}");
		}
		// don't leak database internals to clients
		let message = match self {
			ApiError::Database(_) | ApiError::Service(lokanala::Error::Database(_)) => "database unavailable".to_string(),
			ApiError::Service(lokanala::Error::Storage(ref e)) if !e.is_rejection() => "could not store upload".to_string(),
			ref x => x.to_string(),
		};
		(
			status,
			axum::Json(serde_json::json!({
				"success": false,
				"error": self.tag(),
				"message": message,
			}))
		).into_response()
	}
}

#[cfg(test)]
mod test {
	use axum::{http::StatusCode, response::IntoResponse};

	use super::ApiError;

	async fn body(err: ApiError) -> (StatusCode, serde_json::Value) {
		let res = err.into_response();
		let status = res.status();
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[tokio::test]
	async fn service_errors_map_to_statuses() {
		let (status, json) = body(lokanala::Error::conflict("product already reviewed by this user").into()).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(json["success"], false);
		assert_eq!(json["error"], "conflict");
		assert_eq!(json["message"], "product already reviewed by this user");

		let (status, json) = body(lokanala::Error::NotFound("merchant").into()).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(json["message"], "merchant not found");

		assert_eq!(ApiError::from(lokanala::Error::invalid("bad rating")).status(), StatusCode::BAD_REQUEST);
		assert_eq!(ApiError::from(lokanala::Error::Forbidden).status(), StatusCode::FORBIDDEN);
		assert_eq!(ApiError::from(lokanala::Error::Unauthorized).status(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn database_errors_are_opaque() {
		let (status, json) = body(sea_orm::DbErr::Custom("secret table layout".into()).into()).await;
		assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
		assert_eq!(json["error"], "database");
		assert_eq!(json["message"], "database unavailable");
	}

	#[tokio::test]
	async fn rejected_uploads_are_client_errors() {
		let err : ApiError = lokanala::storage::StorageError::TooLarge(10).into();
		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
		let err : ApiError = lokanala::storage::StorageError::Io(std::io::Error::other("disk full")).into();
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
