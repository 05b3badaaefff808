use lokanala::traits::{admin::Registration, Administrable};

pub async fn register(
	ctx: lokanala::Context,
	name: String,
	email: String,
	password: String,
	phone: Option<String>,
) -> lokanala::Result<()> {
	let user = ctx.register_user(Registration {
		name,
		email,
		password,
		phone,
		push_token: None,
	}).await?;

	tracing::info!("registered new user #{}: {}", user.id, user.email);

	Ok(())
}
