use lokanala::{push::{PushBatch, PushQueue}, traits::Notifier, Context};
use tokio::sync::mpsc;

/// how often an idle worker checks whether it should stop
const IDLE_CHECK: std::time::Duration = std::time::Duration::from_millis(500);

/// Sending half of the push queue, attached to the context so dispatches return
/// as soon as their rows are committed.
pub struct Queue(mpsc::Sender<PushBatch>);

pub fn channel(capacity: usize) -> (Queue, mpsc::Receiver<PushBatch>) {
	let (tx, rx) = mpsc::channel(capacity.max(1));
	(Queue(tx), rx)
}

impl PushQueue for Queue {
	fn enqueue(&self, batch: PushBatch) -> Result<(), PushBatch> {
		match self.0.try_send(batch) {
			Ok(()) => Ok(()),
			Err(mpsc::error::TrySendError::Full(batch)) => {
				tracing::warn!("push queue full, delivering notification {} inline", batch.notification);
				Err(batch)
			},
			Err(mpsc::error::TrySendError::Closed(batch)) => {
				tracing::warn!("push worker gone, delivering notification {} inline", batch.notification);
				Err(batch)
			},
		}
	}
}

pub async fn run(ctx: Context, mut rx: mpsc::Receiver<PushBatch>, concurrency: usize, stop: impl crate::StopToken) {
	let mut pool = tokio::task::JoinSet::new();

	loop {
		if stop.stop() {
			break;
		}

		let batch = match tokio::time::timeout(IDLE_CHECK, rx.recv()).await {
			Err(_) => continue, // idle
			Ok(None) => break,
			Ok(Some(b)) => b,
		};

		spawn_delivery(&ctx, &mut pool, batch);

		while pool.len() >= concurrency.max(1) {
			if let Some(Err(e)) = pool.join_next().await {
				tracing::error!("failed joining delivery task: {e}");
			}
		}
	}

	// whatever was already accepted still gets sent
	rx.close();
	while let Some(batch) = rx.recv().await {
		spawn_delivery(&ctx, &mut pool, batch);
	}

	while let Some(res) = pool.join_next().await {
		if let Err(e) = res {
			tracing::error!("failed joining delivery task: {e}");
		}
	}

	tracing::info!("push delivery worker stopped");
}

fn spawn_delivery(ctx: &Context, pool: &mut tokio::task::JoinSet<()>, batch: PushBatch) {
	let ctx = ctx.clone();
	pool.spawn(async move {
		let notification = batch.notification;
		let report = ctx.deliver(batch).await;
		tracing::info!(
			"notification {notification}: {}/{} pushes delivered, {} tokens invalidated",
			report.delivered, report.attempted, report.invalidated,
		);
	});
}

#[cfg(test)]
mod test {
	use std::sync::{atomic::{AtomicBool, AtomicUsize, Ordering}, Arc};

	use lokanala::{model::notification::NotificationKind, push::{PushBatch, PushError, PushMessage, PushProvider, PushQueue}};

	#[derive(Default, Clone)]
	struct Counting(Arc<AtomicUsize>);

	#[async_trait::async_trait]
	impl PushProvider for Counting {
		async fn send(&self, token: &str, _message: &PushMessage) -> Result<String, PushError> {
			self.0.fetch_add(1, Ordering::SeqCst);
			Ok(format!("sent-{token}"))
		}
	}

	struct Flag(Arc<AtomicBool>);

	impl crate::StopToken for Flag {
		fn stop(&self) -> bool {
			self.0.load(Ordering::Relaxed)
		}
	}

	fn batch(notification: i64) -> PushBatch {
		PushBatch {
			notification,
			kind: NotificationKind::Promo,
			reference: Some(7),
			title: "New promo from Warung Bu Sri".into(),
			body: "Diskon 20%".into(),
			targets: vec![(1, "device-a".into()), (2, "device-b".into())],
		}
	}

	#[test]
	fn full_queue_hands_batch_back() {
		let (queue, _rx) = super::channel(1);
		assert!(queue.enqueue(batch(1)).is_ok());
		let back = queue.enqueue(batch(2)).unwrap_err();
		assert_eq!(back.notification, 2);
	}

	#[test]
	fn closed_queue_hands_batch_back() {
		let (queue, rx) = super::channel(4);
		drop(rx);
		assert_eq!(queue.enqueue(batch(3)).unwrap_err().notification, 3);
	}

	#[tokio::test]
	async fn worker_drains_queue_and_stops() {
		let sends = Counting::default();
		let ctx = lokanala::Context::new(
			sea_orm::DatabaseConnection::Disconnected,
			lokanala::Config::default(),
			Box::new(sends.clone()),
			None,
		);
		let (queue, rx) = super::channel(8);
		for i in 0..4 {
			queue.enqueue(batch(i)).unwrap();
		}
		let flag = Arc::new(AtomicBool::new(false));
		let handle = crate::spawn(ctx, rx, 2, Flag(flag.clone()));
		flag.store(true, Ordering::Relaxed);
		tokio::time::timeout(std::time::Duration::from_secs(5), handle)
			.await
			.expect("worker did not stop")
			.expect("worker panicked");
		// 4 batches with 2 targets each, all accepted before the stop
		assert_eq!(sends.0.load(Ordering::SeqCst), 8);
	}
}
