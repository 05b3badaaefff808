mod register;
pub use register::*;

mod category;
pub use category::*;

mod sessions;
pub use sessions::*;

#[derive(Debug, Clone, clap::Subcommand)]
pub enum CliCommand {
	/// register a new user
	Register {
		/// display name of new user
		name: String,

		/// login email, must be unique
		email: String,

		/// password for new user
		password: String,

		/// contact phone number
		#[arg(long)]
		phone: Option<String>,
	},

	/// add merchant categories, existing ones are skipped
	Category {
		/// category names to add
		#[arg(required = true)]
		names: Vec<String>,
	},

	/// delete expired login sessions
	PurgeSessions,
}

pub async fn run(ctx: lokanala::Context, command: CliCommand) -> Result<(), Box<dyn std::error::Error>> {
	match command {
		CliCommand::Register { ref name, ref email, .. } =>
			tracing::info!("running cli task: register {name} <{email}>"),
		ref other =>
			tracing::info!("running cli task: {other:?}"),
	}
	match command {
		CliCommand::Register { name, email, password, phone } =>
			Ok(register(ctx, name, email, password, phone).await?),
		CliCommand::Category { names } =>
			Ok(category(ctx, names).await?),
		CliCommand::PurgeSessions =>
			Ok(purge_sessions(ctx).await?),
	}
}
