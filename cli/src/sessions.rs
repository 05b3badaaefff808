use lokanala::traits::Administrable;

pub async fn purge_sessions(ctx: lokanala::Context) -> lokanala::Result<()> {
	let count = ctx.purge_sessions().await?;
	tracing::info!("purged {count} expired sessions");
	Ok(())
}
