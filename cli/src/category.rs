use lokanala::traits::Administrable;

pub async fn category(ctx: lokanala::Context, names: Vec<String>) -> lokanala::Result<()> {
	for name in names {
		match ctx.add_merchant_category(&name).await {
			Ok(x) => tracing::info!("added merchant category #{}: {}", x.id, x.name),
			Err(lokanala::Error::Conflict(_)) => tracing::warn!("merchant category '{name}' already exists, skipping"),
			Err(e) => return Err(e),
		}
	}
	Ok(())
}
