use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::Config, push::{PushBatch, PushProvider, PushQueue}, storage::Storage};

#[derive(Clone)]
pub struct Context(Arc<ContextInner>);
struct ContextInner {
	db: DatabaseConnection,
	config: Config,
	storage: Storage,
	push: Box<dyn PushProvider>,
	queue: Option<Box<dyn PushQueue>>,
}

impl Context {
	pub fn new(db: DatabaseConnection, config: Config, push: Box<dyn PushProvider>, queue: Option<Box<dyn PushQueue>>) -> Self {
		let storage = Storage::new(&config.storage.upload_dir, config.storage.max_upload_bytes);
		Context(Arc::new(ContextInner { db, config, storage, push, queue }))
	}

	pub fn db(&self) -> &DatabaseConnection {
		&self.0.db
	}

	pub fn cfg(&self) -> &Config {
		&self.0.config
	}

	pub fn storage(&self) -> &Storage {
		&self.0.storage
	}

	pub fn push(&self) -> &dyn PushProvider {
		self.0.push.as_ref()
	}

	/// hand a batch to the background worker, if any is attached. gives the batch back
	/// when it should be delivered inline instead
	pub fn enqueue(&self, batch: PushBatch) -> Result<(), PushBatch> {
		match self.0.queue {
			Some(ref queue) => queue.enqueue(batch),
			None => Err(batch),
		}
	}
}
