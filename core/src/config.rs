
#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct Config {
	#[serde(default)]
	pub instance: InstanceConfig,

	#[serde(default)]
	pub datasource: DatasourceConfig,

	#[serde(default)]
	pub security: SecurityConfig,

	#[serde(default)]
	pub push: PushConfig,

	#[serde(default)]
	pub storage: StorageConfig,
}

#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct InstanceConfig {
	#[serde_inline_default("lokanala".into())]
	pub name: String,

	#[serde_inline_default("local merchants, products and promos near you".into())]
	pub description: String,
}

#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct DatasourceConfig {
	#[serde_inline_default("sqlite://./lokanala.db?mode=rwc".into())]
	pub connection_string: String,

	#[serde_inline_default(32)]
	pub max_connections: u32,

	#[serde_inline_default(1)]
	pub min_connections: u32,

	#[serde_inline_default(90u64)]
	pub connect_timeout_seconds: u64,

	#[serde_inline_default(30u64)]
	pub acquire_timeout_seconds: u64,

	#[serde_inline_default(10u64)]
	pub slow_query_warn_seconds: u64,

	#[serde_inline_default(true)]
	pub slow_query_warn_enable: bool,
}

#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct SecurityConfig {
	#[serde_inline_default(true)]
	pub allow_registration: bool,

	#[serde_inline_default(7 * 24)]
	pub session_duration_hours: i64,

	#[serde_inline_default(6)]
	pub min_password_length: usize,
}

#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct PushConfig {
	/// firebase project receiving send requests, pushes are only logged when unset
	#[serde(default)]
	pub fcm_project_id: Option<String>,

	/// oauth2 bearer token for the FCM v1 api, minted outside of lokanala
	#[serde(default)]
	pub fcm_access_token: Option<String>,

	#[serde_inline_default("https://fcm.googleapis.com".into())]
	pub endpoint: String,

	#[serde_inline_default(10u64)]
	pub timeout_seconds: u64,

	#[serde_inline_default(8)]
	pub concurrency: usize,

	#[serde_inline_default(256)]
	pub queue_capacity: usize,

	#[serde_inline_default("promo_channel".into())]
	pub android_channel: String,
}

#[serde_inline_default::serde_inline_default]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, serde_default::DefaultFromSerde)]
pub struct StorageConfig {
	#[serde_inline_default("./public/uploads".into())]
	pub upload_dir: String,

	#[serde_inline_default(5 * 1024 * 1024)]
	pub max_upload_bytes: usize,

	#[serde_inline_default(5)]
	pub max_review_photos: usize,
}

impl Config {
	pub fn load(path: Option<&std::path::PathBuf>) -> Self {
		let Some(cfg_path) = path else { return Config::default() };
		match std::fs::read_to_string(cfg_path) {
			Ok(x) => match toml::from_str(&x) {
				Ok(cfg) => return cfg,
				Err(e) => tracing::error!("failed parsing config file: {e}"),
			},
			Err(e) => tracing::error!("failed reading config file: {e}"),
		}
		Config::default()
	}
}

#[cfg(test)]
mod test {
	#[test]
	fn partial_config_keeps_defaults() {
		let cfg : super::Config = toml::from_str("[push]\nconcurrency = 2\n").unwrap();
		assert_eq!(cfg.push.concurrency, 2);
		assert_eq!(cfg.push.timeout_seconds, 10);
		assert_eq!(cfg.storage.max_review_photos, 5);
		assert!(cfg.security.allow_registration);
		assert!(cfg.push.fcm_project_id.is_none());
	}
}
