use std::{collections::BTreeSet, sync::{Arc, Mutex}};

use lokanala_migrations::MigratorTrait;
use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, ConnectOptions, Database, DatabaseConnection};

use crate::{model, push::{PushBatch, PushError, PushMessage, PushProvider, PushQueue}, Config, Context};

pub type Sent = Arc<Mutex<Vec<(String, PushMessage)>>>;

/// records every send, failing the tokens it is told to fail
#[derive(Default)]
pub struct MockPush {
	pub sent: Sent,
	pub failing: BTreeSet<String>,
	pub unregistered: BTreeSet<String>,
}

#[async_trait::async_trait]
impl PushProvider for MockPush {
	async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError> {
		self.sent.lock().expect("poisoned mock").push((token.to_string(), message.clone()));
		if self.unregistered.contains(token) {
			return Err(PushError::Unregistered);
		}
		if self.failing.contains(token) {
			return Err(PushError::Transient("mock failure".into()));
		}
		Ok(format!("sent-{token}"))
	}
}

#[derive(Default, Clone)]
pub struct MockQueue(pub Arc<Mutex<Vec<PushBatch>>>);

impl PushQueue for MockQueue {
	fn enqueue(&self, batch: PushBatch) -> Result<(), PushBatch> {
		self.0.lock().expect("poisoned mock").push(batch);
		Ok(())
	}
}

pub async fn database() -> DatabaseConnection {
	let mut opts = ConnectOptions::new("sqlite::memory:");
	opts.max_connections(1).min_connections(1).sqlx_logging(false);
	let db = Database::connect(opts).await.expect("could not open in-memory sqlite");
	lokanala_migrations::Migrator::up(&db, None).await.expect("could not apply migrations");
	db
}

pub fn config() -> Config {
	let mut cfg = Config::default();
	cfg.storage.upload_dir = std::env::temp_dir()
		.join(format!("lokanala-test-{}", uuid::Uuid::new_v4()))
		.to_string_lossy()
		.to_string();
	cfg.push.concurrency = 2;
	cfg.push.timeout_seconds = 2;
	cfg
}

pub async fn context_with(push: MockPush) -> Context {
	Context::new(database().await, config(), Box::new(push), None)
}

pub async fn context() -> (Context, Sent) {
	let push = MockPush::default();
	let sent = push.sent.clone();
	(context_with(push).await, sent)
}

pub async fn user(ctx: &Context, name: &str, token: Option<&str>) -> i64 {
	model::user::ActiveModel {
		id: NotSet,
		name: Set(name.to_string()),
		email: Set(format!("{name}@example.com")),
		password: Set(sha256::digest("password")),
		phone: Set(None),
		photo: Set(None),
		push_token: Set(token.map(str::to_string)),
		created: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert user")
		.id
}

pub async fn merchant_category(ctx: &Context, name: &str) -> i64 {
	model::merchant_category::ActiveModel {
		id: NotSet,
		name: Set(name.to_string()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert merchant category")
		.id
}

pub async fn merchant(ctx: &Context, owner: i64, name: &str) -> i64 {
	let category = merchant_category(ctx, &format!("{name}-category")).await;
	model::merchant::ActiveModel {
		id: NotSet,
		owner: Set(owner),
		category: Set(category),
		name: Set(name.to_string()),
		address: Set(None),
		phone: Set(None),
		description: Set(None),
		location: Set(None),
		image: Set(None),
		registered: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert merchant")
		.id
}

pub async fn product(ctx: &Context, merchant: i64, name: &str) -> i64 {
	model::product::ActiveModel {
		id: NotSet,
		merchant: Set(merchant),
		category: Set(None),
		name: Set(name.to_string()),
		description: Set(None),
		price: Set(10_000),
		image: Set(None),
		created: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert product")
		.id
}

/// stores a review row directly, skipping ingestion and its notification
pub async fn review(ctx: &Context, product: i64, user: i64, rating: i32) -> i64 {
	model::review::ActiveModel {
		id: NotSet,
		product: Set(product),
		user: Set(user),
		rating: Set(rating),
		comment: Set(String::new()),
		photos: Set(None),
		published: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert review")
		.id
}

pub async fn follow(ctx: &Context, user: i64, merchant: i64) {
	model::follow::ActiveModel {
		id: NotSet,
		user: Set(user),
		merchant: Set(merchant),
		created: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.expect("could not insert follow");
}
