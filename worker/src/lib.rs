pub mod delivery;

pub use delivery::{channel, Queue};

pub fn spawn(
	ctx: lokanala::Context,
	rx: tokio::sync::mpsc::Receiver<lokanala::push::PushBatch>,
	concurrency: usize,
	stop: impl StopToken,
) -> tokio::task::JoinHandle<()> {
	tokio::spawn(async move {
		tracing::info!("starting push delivery worker");
		delivery::run(ctx, rx, concurrency, stop).await
	})
}

pub trait StopToken: Sync + Send + 'static {
	fn stop(&self) -> bool;
}
