use tower_http::classify::{SharedClassifier, StatusInRangeAsFailures};

pub mod auth;
pub use auth::{AuthIdentity, Identity};

pub mod error;
pub use error::{ApiError, ApiResult};

pub mod builders;
pub mod views;
pub mod upload;
pub mod api;

pub fn router(ctx: lokanala::Context) -> axum::Router {
	use tower_http::{cors::CorsLayer, trace::TraceLayer};

	axum::Router::new()
		.nest("/api", api::api_routes(ctx))
		.layer(
			// 4xx are logged too, mobile clients rarely report what they sent
			TraceLayer::new(SharedClassifier::new(StatusInRangeAsFailures::new(400..=999)))
				.make_span_with(|req: &axum::http::Request<_>| {
					tracing::span!(
						tracing::Level::INFO,
						"request",
						method = %req.method(),
						uri = %req.uri(),
						status_code = tracing::field::Empty,
					)
				})
		)
		.layer(CorsLayer::permissive())
}

pub async fn serve(ctx: lokanala::Context, bind: String, shutdown: impl ShutdownToken) -> Result<(), std::io::Error> {
	let router = router(ctx);

	tracing::info!("serving api routes on {bind}");

	let listener = tokio::net::TcpListener::bind(bind).await?;
	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown.event())
		.await?;

	Ok(())
}

pub trait ShutdownToken: Sync + Send + 'static {
	fn event(self) -> impl std::future::Future<Output = ()> + std::marker::Send;
}

#[cfg(test)]
mod test {
	use axum::{body::Body, http::{header, Method, Request, StatusCode}};
	use lokanala::traits::Administrable;
	use lokanala_migrations::MigratorTrait;
	use sea_orm::{ConnectOptions, Database};
	use tower::ServiceExt;

	async fn context() -> lokanala::Context {
		let mut opts = ConnectOptions::new("sqlite::memory:");
		opts.max_connections(1).min_connections(1).sqlx_logging(false);
		let db = Database::connect(opts).await.unwrap();
		lokanala_migrations::Migrator::up(&db, None).await.unwrap();
		let mut cfg = lokanala::Config::default();
		cfg.storage.upload_dir = std::env::temp_dir()
			.join(format!("lokanala-routes-{}", uuid::Uuid::new_v4()))
			.to_string_lossy()
			.to_string();
		lokanala::Context::new(db, cfg, Box::new(lokanala::push::Silent), None)
	}

	async fn call(ctx: &lokanala::Context, method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
		let mut req = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
		}
		let req = match body {
			Some(json) => req
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(json.to_string()))
				.unwrap(),
			None => req.body(Body::empty()).unwrap(),
		};
		let res = super::router(ctx.clone()).oneshot(req).await.unwrap();
		let status = res.status();
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
		(status, json)
	}

	async fn login(ctx: &lokanala::Context, name: &str) -> (i64, String) {
		let (status, _) = call(ctx, Method::PUT, "/api/auth", None, Some(serde_json::json!({
			"name": name,
			"email": format!("{name}@example.com"),
			"password": "sambal-matah",
		}))).await;
		assert_eq!(status, StatusCode::CREATED);
		let (status, json) = call(ctx, Method::POST, "/api/auth", None, Some(serde_json::json!({
			"email": format!("{name}@example.com"),
			"password": "sambal-matah",
			"push_token": format!("device-{name}"),
		}))).await;
		assert_eq!(status, StatusCode::OK);
		(
			json["data"]["user"].as_i64().unwrap(),
			json["data"]["token"].as_str().unwrap().to_string(),
		)
	}

	#[tokio::test]
	async fn private_routes_need_a_session() {
		let ctx = context().await;
		let (status, json) = call(&ctx, Method::GET, "/api/me/notifications", None, None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert_eq!(json["success"], false);

		let (status, _) = call(&ctx, Method::GET, "/api/me/notifications", Some("not-a-session"), None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);

		let (_, token) = login(&ctx, "sari").await;
		let (status, json) = call(&ctx, Method::GET, "/api/me/notifications", Some(&token), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["success"], true);
		assert_eq!(json["data"], serde_json::json!([]));

		let (status, _) = call(&ctx, Method::DELETE, "/api/auth", Some(&token), None).await;
		assert_eq!(status, StatusCode::OK);
		let (status, _) = call(&ctx, Method::GET, "/api/me/notifications", Some(&token), None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn duplicate_registration_conflicts() {
		let ctx = context().await;
		login(&ctx, "budi").await;
		let (status, json) = call(&ctx, Method::PUT, "/api/auth", None, Some(serde_json::json!({
			"name": "budi again",
			"email": "BUDI@example.com",
			"password": "sambal-matah",
		}))).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(json["error"], "conflict");
	}

	#[tokio::test]
	async fn missing_resources_are_not_found() {
		let ctx = context().await;
		let (_, token) = login(&ctx, "wati").await;

		let (status, json) = call(&ctx, Method::GET, "/api/merchants/404", None, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(json["success"], false);

		let (status, _) = call(&ctx, Method::POST, "/api/merchants/404/follow", Some(&token), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (status, json) = call(&ctx, Method::GET, "/api/products/404/rating", None, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["data"]["count"], 0);
	}

	fn multipart(boundary: &str, fields: &[(&str, &str)], photo: (&str, &[u8])) -> Vec<u8> {
		let mut body = Vec::new();
		for (name, value) in fields {
			body.extend_from_slice(format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
		}
		body.extend_from_slice(format!(
			"--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
			photo.0,
		).as_bytes());
		body.extend_from_slice(photo.1);
		body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
		body
	}

	#[tokio::test]
	async fn rejected_review_upload_leaves_no_files() {
		let ctx = context().await;
		let (_, token) = login(&ctx, "ayu").await;
		let boundary = "lokanala-form-boundary";
		let body = multipart(boundary, &[("product", "1"), ("rating", "lima")], ("nasi-goreng.png", b"\x89PNG\r\n\x1a\nnot really"));
		let req = Request::builder()
			.method(Method::POST)
			.uri("/api/reviews")
			.header(header::AUTHORIZATION, format!("Bearer {token}"))
			.header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
			.body(Body::from(body))
			.unwrap();
		let res = super::router(ctx.clone()).oneshot(req).await.unwrap();
		assert_eq!(res.status(), StatusCode::BAD_REQUEST);
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		let json : serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(json["success"], false);

		let stored = std::fs::read_dir(ctx.storage().dir()).map(|d| d.count()).unwrap_or(0);
		assert_eq!(stored, 0);
	}

	#[tokio::test]
	async fn merchant_categories_are_listed() {
		let ctx = context().await;
		ctx.add_merchant_category("kuliner").await.unwrap();
		ctx.add_merchant_category("fashion").await.unwrap();
		let (status, json) = call(&ctx, Method::GET, "/api/merchant-categories", None, None).await;
		assert_eq!(status, StatusCode::OK);
		let names : Vec<&str> = json["data"]
			.as_array()
			.unwrap()
			.iter()
			.filter_map(|c| c["name"].as_str())
			.collect();
		assert!(names.contains(&"kuliner"));
		assert!(names.contains(&"fashion"));

		let (status, json) = call(&ctx, Method::GET, "/api/merchants", None, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["data"], serde_json::json!([]));
	}
}
