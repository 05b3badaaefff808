use axum::{http::StatusCode, Json};

/// Body of every successful response.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Reply<T: serde::Serialize> {
	pub success: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

pub fn ok<T: serde::Serialize>(message: impl ToString, data: T) -> Json<Reply<T>> {
	Json(Reply {
		success: true,
		message: message.to_string(),
		data: Some(data),
	})
}

pub fn created<T: serde::Serialize>(message: impl ToString, data: T) -> (StatusCode, Json<Reply<T>>) {
	(StatusCode::CREATED, ok(message, data))
}

pub fn done(message: impl ToString) -> Json<Reply<()>> {
	Json(Reply {
		success: true,
		message: message.to_string(),
		data: None,
	})
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Pagination {
	pub offset: Option<u64>,
	pub batch: Option<u64>,
}

impl Pagination {
	pub fn pagination(&self) -> (u64, u64) {
		let limit = self.batch.unwrap_or(20).min(50);
		let offset = self.offset.unwrap_or(0);
		(limit, offset)
	}
}
