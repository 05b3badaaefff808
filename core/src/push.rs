use std::collections::BTreeMap;

use crate::config::PushConfig;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
	/// device token is no longer valid and should be forgotten
	#[error("device token is not registered anymore")]
	Unregistered,

	#[error("push provider rejected message: {0}")]
	Rejected(String),

	#[error("push provider unreachable: {0}")]
	Transient(String),

	#[error("push timed out after {0}s")]
	Timeout(u64),
}

impl From<reqwest::Error> for PushError {
	fn from(value: reqwest::Error) -> Self {
		PushError::Transient(value.to_string())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
	pub title: String,
	pub body: String,
	pub data: BTreeMap<String, String>,
}

#[async_trait::async_trait]
pub trait PushProvider: Send + Sync {
	/// deliver one message to one device, returns provider message id
	async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError>;
}

/// Everything needed to push one notification to its recipients, detached from the
/// request that produced it so it can be handed to a background worker.
#[derive(Debug, Clone)]
pub struct PushBatch {
	pub notification: i64,
	pub kind: crate::model::notification::NotificationKind,
	pub reference: Option<i64>,
	pub title: String,
	pub body: String,
	/// (user, device token) pairs, only recipients with a token end up here
	pub targets: Vec<(i64, String)>,
}

impl PushBatch {
	pub fn message_for(&self, user: i64) -> PushMessage {
		let mut data = BTreeMap::new();
		data.insert("targetUserId".to_string(), user.to_string());
		data.insert("type".to_string(), self.kind.tag().to_string());
		data.insert("notificationId".to_string(), self.notification.to_string());
		data.insert(
			self.kind.reference_key().to_string(),
			self.reference.map(|x| x.to_string()).unwrap_or_default(),
		);
		data.insert("timestamp".to_string(), chrono::Utc::now().timestamp_millis().to_string());
		PushMessage {
			title: self.title.clone(),
			body: self.body.clone(),
			data,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
	pub attempted: usize,
	pub delivered: usize,
	pub invalidated: usize,
}

/// Somewhere to hand push batches to instead of sending them inline.
pub trait PushQueue: Sync + Send {
	/// gives the batch back when it can't be accepted right now
	fn enqueue(&self, batch: PushBatch) -> Result<(), PushBatch>;
}

/// Firebase Cloud Messaging, HTTP v1 api.
pub struct Fcm {
	client: reqwest::Client,
	url: String,
	access_token: String,
	channel: String,
}

impl Fcm {
	pub fn new(cfg: &PushConfig, project: &str, access_token: &str) -> Self {
		Fcm {
			client: reqwest::Client::new(),
			url: format!("{}/v1/projects/{project}/messages:send", cfg.endpoint.trim_end_matches('/')),
			access_token: access_token.to_string(),
			channel: cfg.android_channel.clone(),
		}
	}

	fn payload(&self, token: &str, message: &PushMessage) -> serde_json::Value {
		serde_json::json!({
			"message": {
				"token": token,
				"notification": {
					"title": message.title,
					"body": message.body,
				},
				"data": message.data,
				"android": {
					"priority": "high",
					"notification": {
						"sound": "default",
						"channel_id": self.channel,
					},
				},
				"apns": {
					"payload": {
						"aps": {
							"sound": "default",
							"badge": 1,
							"content-available": 1,
						},
					},
				},
			},
		})
	}
}

#[async_trait::async_trait]
impl PushProvider for Fcm {
	async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError> {
		let res = self.client
			.post(&self.url)
			.bearer_auth(&self.access_token)
			.json(&self.payload(token, message))
			.send()
			.await?;

		let status = res.status();
		let body = res.text().await?;

		if status.is_success() {
			let name = serde_json::from_str::<serde_json::Value>(&body)
				.ok()
				.and_then(|x| x.get("name").and_then(|n| n.as_str()).map(str::to_string))
				.unwrap_or_default();
			return Ok(name);
		}

		if status == reqwest::StatusCode::NOT_FOUND || body.contains("UNREGISTERED") {
			return Err(PushError::Unregistered);
		}

		if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
			return Err(PushError::Transient(format!("{status}: {body}")));
		}

		Err(PushError::Rejected(format!("{status}: {body}")))
	}
}

/// Used when no provider is configured: notifications still get persisted, pushes are
/// only logged.
pub struct Silent;

#[async_trait::async_trait]
impl PushProvider for Silent {
	async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError> {
		tracing::debug!("no push provider configured, not sending '{}' to {token}", message.title);
		Ok(String::new())
	}
}

pub fn provider(cfg: &PushConfig) -> Box<dyn PushProvider> {
	match (&cfg.fcm_project_id, &cfg.fcm_access_token) {
		(Some(project), Some(token)) => {
			tracing::info!("delivering push notifications through FCM project {project}");
			Box::new(Fcm::new(cfg, project, token))
		},
		(Some(_), None) | (None, Some(_)) => {
			tracing::warn!("incomplete FCM configuration, push notifications will only be logged");
			Box::new(Silent)
		},
		(None, None) => Box::new(Silent),
	}
}

#[cfg(test)]
mod test {
	use crate::model::notification::NotificationKind;

	#[test]
	fn push_message_carries_recipient_and_correlation_id() {
		let batch = super::PushBatch {
			notification: 7,
			kind: NotificationKind::Promo,
			reference: Some(42),
			title: "Promo".into(),
			body: "half price".into(),
			targets: vec![(3, "tok".into())],
		};
		let msg = batch.message_for(3);
		assert_eq!(msg.data.get("targetUserId").map(String::as_str), Some("3"));
		assert_eq!(msg.data.get("type").map(String::as_str), Some("promo"));
		assert_eq!(msg.data.get("promoId").map(String::as_str), Some("42"));
		assert_eq!(msg.title, "Promo");
	}

	#[test]
	fn fcm_payload_targets_token() {
		let cfg = crate::config::PushConfig::default();
		let fcm = super::Fcm::new(&cfg, "demo", "secret");
		assert_eq!(fcm.url, "https://fcm.googleapis.com/v1/projects/demo/messages:send");
		let msg = super::PushMessage { title: "t".into(), body: "b".into(), data: Default::default() };
		let payload = fcm.payload("device", &msg);
		assert_eq!(payload["message"]["token"], "device");
		assert_eq!(payload["message"]["android"]["notification"]["channel_id"], "promo_channel");
	}
}
