use std::collections::BTreeSet;

use sea_orm::{sea_query::Expr, ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};

use crate::{
	ext::LoggableError,
	model::{self, notification::NotificationKind},
	push::{PushBatch, PushError, PushReport},
};

/// What happened, independently of who gets told.
#[derive(Debug, Clone)]
pub struct Notice {
	pub kind: NotificationKind,
	pub reference: Option<i64>,
	pub title: String,
	pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
	pub user: i64,
	pub push_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
	pub notification: i64,
	pub recipients: usize,
	pub attempted: usize,
	/// successful pushes, unknown when delivery was handed to the background worker
	pub delivered: Option<usize>,
}

#[allow(async_fn_in_trait)]
pub trait Notifier {
	/// persist one notification with a delivery row per distinct recipient, then push it
	/// to every recipient holding a device token. push failures never fail the dispatch
	async fn notify(&self, notice: Notice, audience: Vec<Recipient>) -> Result<Dispatch, DbErr>;

	/// send one batch of pushes, bounded by configured concurrency and timeout
	async fn deliver(&self, batch: PushBatch) -> PushReport;

	async fn followers_audience(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<Recipient>, DbErr>;
	async fn owner_audience(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Option<Recipient>, DbErr>;

	async fn announce_promo(&self, promo: &model::promo::Model, merchant: &model::merchant::Model);
	async fn announce_product(&self, product: &model::product::Model, merchant: &model::merchant::Model);
	async fn announce_review(&self, review: &model::review::Model, product: &model::product::Model, merchant: &model::merchant::Model);

	async fn notifications_of(&self, user: i64, offset: u64, limit: u64, tx: &impl ConnectionTrait) -> Result<Vec<(model::delivery::Model, model::notification::Model)>, DbErr>;
}

impl Notifier for crate::Context {
	async fn notify(&self, notice: Notice, audience: Vec<Recipient>) -> Result<Dispatch, DbErr> {
		let mut seen = BTreeSet::new();
		let audience : Vec<Recipient> = audience
			.into_iter()
			.filter(|r| seen.insert(r.user))
			.collect();

		let now = chrono::Utc::now();
		let tx = self.db().begin().await?;

		let notification = model::notification::ActiveModel {
			id: NotSet,
			kind: Set(notice.kind),
			reference: Set(notice.reference),
			title: Set(notice.title.clone()),
			body: Set(notice.body.clone()),
			created: Set(now),
		}
			.insert(&tx)
			.await?;

		if !audience.is_empty() {
			model::delivery::Entity::insert_many(
				audience.iter().map(|r| model::delivery::ActiveModel {
					id: NotSet,
					notification: Set(notification.id),
					user: Set(r.user),
					delivered: Set(now),
				})
			)
				.exec(&tx)
				.await?;
		}

		tx.commit().await?;

		let batch = PushBatch {
			notification: notification.id,
			kind: notice.kind,
			reference: notice.reference,
			title: notice.title,
			body: notice.body,
			targets: audience
				.iter()
				.filter_map(|r| Some((r.user, r.push_token.clone().filter(|t| !t.is_empty())?)))
				.collect(),
		};

		let attempted = batch.targets.len();
		let delivered = if attempted == 0 {
			Some(0)
		} else {
			match self.enqueue(batch) {
				Ok(()) => None,
				Err(batch) => Some(self.deliver(batch).await.delivered),
			}
		};

		tracing::info!(
			"dispatched {} notification #{} to {} recipients: {attempted} pushes, {} delivered",
			notice.kind.tag(), notification.id, audience.len(),
			delivered.map(|x| x.to_string()).unwrap_or("queued".into()),
		);

		Ok(Dispatch {
			notification: notification.id,
			recipients: audience.len(),
			attempted,
			delivered,
		})
	}

	async fn deliver(&self, batch: PushBatch) -> PushReport {
		let concurrency = self.cfg().push.concurrency.max(1);
		let timeout_secs = self.cfg().push.timeout_seconds;
		let timeout = std::time::Duration::from_secs(timeout_secs);
		let mut report = PushReport::default();
		let mut pool = tokio::task::JoinSet::new();

		for (user, token) in batch.targets.iter() {
			while pool.len() >= concurrency {
				if let Some(res) = pool.join_next().await {
					settle(self, res, &mut report).await;
				}
			}

			let ctx = self.clone();
			let message = batch.message_for(*user);
			let (user, token) = (*user, token.clone());
			report.attempted += 1;
			pool.spawn(async move {
				let res = match tokio::time::timeout(timeout, ctx.push().send(&token, &message)).await {
					Ok(res) => res,
					Err(_) => Err(PushError::Timeout(timeout_secs)),
				};
				(user, token, res)
			});
		}

		while let Some(res) = pool.join_next().await {
			settle(self, res, &mut report).await;
		}

		report
	}

	async fn followers_audience(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<Recipient>, DbErr> {
		Ok(
			model::follow::Entity::find()
				.inner_join(model::user::Entity)
				.filter(model::follow::Column::Merchant.eq(merchant))
				.order_by_asc(model::follow::Column::Id)
				.select_only()
				.column(model::user::Column::Id)
				.column(model::user::Column::PushToken)
				.into_tuple::<(i64, Option<String>)>()
				.all(tx)
				.await?
				.into_iter()
				.map(|(user, push_token)| Recipient { user, push_token })
				.collect()
		)
	}

	async fn owner_audience(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Option<Recipient>, DbErr> {
		Ok(
			model::merchant::Entity::find_by_id(merchant)
				.inner_join(model::user::Entity)
				.select_only()
				.column(model::user::Column::Id)
				.column(model::user::Column::PushToken)
				.into_tuple::<(i64, Option<String>)>()
				.one(tx)
				.await?
				.map(|(user, push_token)| Recipient { user, push_token })
		)
	}

	async fn announce_promo(&self, promo: &model::promo::Model, merchant: &model::merchant::Model) {
		announce(
			self,
			merchant,
			Notice {
				kind: NotificationKind::Promo,
				reference: Some(promo.id),
				title: format!("New promo from {}", merchant.name),
				body: promo.description.clone().unwrap_or_else(|| promo.name.clone()),
			},
			Notice {
				kind: NotificationKind::Promo,
				reference: Some(promo.id),
				title: "Promo published".to_string(),
				body: format!("'{}' is now visible to your followers", promo.name),
			},
		).await
	}

	async fn announce_product(&self, product: &model::product::Model, merchant: &model::merchant::Model) {
		announce(
			self,
			merchant,
			Notice {
				kind: NotificationKind::Product,
				reference: Some(product.id),
				title: format!("New product from {}", merchant.name),
				body: product.name.clone(),
			},
			Notice {
				kind: NotificationKind::Product,
				reference: Some(product.id),
				title: "Product published".to_string(),
				body: format!("'{}' is now listed in {}", product.name, merchant.name),
			},
		).await
	}

	async fn announce_review(&self, review: &model::review::Model, product: &model::product::Model, merchant: &model::merchant::Model) {
		let owner = match self.owner_audience(merchant.id, self.db()).await {
			Ok(Some(x)) => x,
			Ok(None) => return tracing::warn!("merchant #{} has no owner to notify", merchant.id),
			Err(e) => return tracing::error!("could not resolve owner of merchant #{}: {e}", merchant.id),
		};
		let notice = Notice {
			kind: NotificationKind::Review,
			reference: Some(review.id),
			title: format!("New review for {}", product.name),
			body: format!("{} stars: {}", review.rating, review.comment),
		};
		self.notify(notice, vec![owner])
			.await
			.err_failed("failed dispatching review notification");
	}

	async fn notifications_of(&self, user: i64, offset: u64, limit: u64, tx: &impl ConnectionTrait) -> Result<Vec<(model::delivery::Model, model::notification::Model)>, DbErr> {
		Ok(
			model::delivery::Entity::find()
				.filter(model::delivery::Column::User.eq(user))
				.find_also_related(model::notification::Entity)
				.order_by_desc(model::delivery::Column::Delivered)
				.order_by_desc(model::delivery::Column::Id)
				.offset(offset)
				.limit(limit)
				.all(tx)
				.await?
				.into_iter()
				.filter_map(|(delivery, notification)| Some((delivery, notification?)))
				.collect()
		)
	}
}

/// followers get the news, the owner gets a separate confirmation
async fn announce(ctx: &crate::Context, merchant: &model::merchant::Model, news: Notice, confirmation: Notice) {
	match ctx.followers_audience(merchant.id, ctx.db()).await {
		Ok(followers) => ctx.notify(news, followers)
			.await
			.err_failed("failed dispatching notification to followers"),
		Err(e) => tracing::error!("could not resolve followers of merchant #{}: {e}", merchant.id),
	}

	match ctx.owner_audience(merchant.id, ctx.db()).await {
		Ok(Some(owner)) => ctx.notify(confirmation, vec![owner])
			.await
			.err_failed("failed dispatching confirmation to merchant owner"),
		Ok(None) => tracing::warn!("merchant #{} has no owner to confirm to", merchant.id),
		Err(e) => tracing::error!("could not resolve owner of merchant #{}: {e}", merchant.id),
	}
}

type Sent = (i64, String, Result<String, PushError>);

async fn settle(ctx: &crate::Context, res: Result<Sent, tokio::task::JoinError>, report: &mut PushReport) {
	match res {
		Ok((user, _, Ok(id))) => {
			tracing::debug!("push delivered to user #{user}: {id}");
			report.delivered += 1;
		},
		Ok((user, token, Err(PushError::Unregistered))) => {
			tracing::info!("forgetting unregistered push token of user #{user}");
			report.invalidated += 1;
			model::user::Entity::update_many()
				.col_expr(model::user::Column::PushToken, Expr::value(Option::<String>::None))
				.filter(model::user::Column::Id.eq(user))
				.filter(model::user::Column::PushToken.eq(token))
				.exec(ctx.db())
				.await
				.warn_failed("could not clear invalid push token");
		},
		Ok((user, _, Err(e))) => tracing::warn!("failed pushing notification to user #{user}: {e}"),
		Err(e) => tracing::error!("push task crashed: {e}"),
	}
}

#[cfg(test)]
mod test {
	use sea_orm::{EntityTrait, PaginatorTrait};

	use super::{Notice, Notifier, Recipient};
	use crate::{model::{self, notification::NotificationKind}, testing};

	fn notice() -> Notice {
		Notice {
			kind: NotificationKind::Promo,
			reference: Some(1),
			title: "title".into(),
			body: "body".into(),
		}
	}

	#[tokio::test]
	async fn one_notification_and_a_delivery_per_recipient() {
		let mut push = testing::MockPush::default();
		push.failing.insert("tok-b".into());
		let sent = push.sent.clone();
		let ctx = testing::context_with(push).await;

		let mut audience = Vec::new();
		for (name, token) in [("a", Some("tok-a")), ("b", Some("tok-b")), ("c", None), ("d", Some("tok-d"))] {
			let user = testing::user(&ctx, name, token).await;
			audience.push(Recipient { user, push_token: token.map(str::to_string) });
		}
		// duplicates collapse into a single delivery
		audience.push(audience[0].clone());

		let dispatch = ctx.notify(notice(), audience).await.unwrap();
		assert_eq!(dispatch.recipients, 4);
		assert_eq!(dispatch.attempted, 3);
		assert_eq!(dispatch.delivered, Some(2));
		assert_eq!(sent.lock().unwrap().len(), 3);

		assert_eq!(model::notification::Entity::find().count(ctx.db()).await.unwrap(), 1);
		assert_eq!(model::delivery::Entity::find().count(ctx.db()).await.unwrap(), 4);
	}

	#[tokio::test]
	async fn pushes_carry_recipient_id() {
		let (ctx, sent) = testing::context().await;
		let user = testing::user(&ctx, "a", Some("tok-a")).await;
		ctx.notify(notice(), vec![Recipient { user, push_token: Some("tok-a".into()) }]).await.unwrap();
		let sent = sent.lock().unwrap();
		assert_eq!(sent[0].0, "tok-a");
		assert_eq!(sent[0].1.data.get("targetUserId"), Some(&user.to_string()));
		assert_eq!(sent[0].1.data.get("promoId").map(String::as_str), Some("1"));
	}

	#[tokio::test]
	async fn empty_audience_still_records_notification() {
		let (ctx, sent) = testing::context().await;
		let dispatch = ctx.notify(notice(), Vec::new()).await.unwrap();
		assert_eq!(dispatch.recipients, 0);
		assert_eq!(dispatch.delivered, Some(0));
		assert!(sent.lock().unwrap().is_empty());
		assert_eq!(model::notification::Entity::find().count(ctx.db()).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn unregistered_token_is_forgotten() {
		let mut push = testing::MockPush::default();
		push.unregistered.insert("stale".into());
		let ctx = testing::context_with(push).await;
		let stale = testing::user(&ctx, "stale", Some("stale")).await;
		let fresh = testing::user(&ctx, "fresh", Some("fresh")).await;

		let dispatch = ctx.notify(notice(), vec![
			Recipient { user: stale, push_token: Some("stale".into()) },
			Recipient { user: fresh, push_token: Some("fresh".into()) },
		]).await.unwrap();
		assert_eq!(dispatch.delivered, Some(1));

		assert_eq!(model::user::Entity::push_token_of(stale, ctx.db()).await.unwrap(), None);
		assert_eq!(model::user::Entity::push_token_of(fresh, ctx.db()).await.unwrap().as_deref(), Some("fresh"));
	}

	#[tokio::test]
	async fn queued_dispatch_leaves_delivery_unknown() {
		let queue = testing::MockQueue::default();
		let ctx = crate::Context::new(
			testing::database().await,
			testing::config(),
			Box::new(testing::MockPush::default()),
			Some(Box::new(queue.clone())),
		);
		let user = testing::user(&ctx, "a", Some("tok-a")).await;
		let dispatch = ctx.notify(notice(), vec![Recipient { user, push_token: Some("tok-a".into()) }]).await.unwrap();
		assert_eq!(dispatch.delivered, None);
		assert_eq!(dispatch.attempted, 1);
		let queued = queue.0.lock().unwrap();
		assert_eq!(queued.len(), 1);
		assert_eq!(queued[0].targets, vec![(user, "tok-a".to_string())]);
	}

	#[tokio::test]
	async fn promo_announcement_reaches_followers_and_owner() {
		let (ctx, sent) = testing::context().await;
		let owner = testing::user(&ctx, "owner", Some("tok-owner")).await;
		let merchant_id = testing::merchant(&ctx, owner, "warung").await;
		let with_token = testing::user(&ctx, "a", Some("tok-a")).await;
		let without_token = testing::user(&ctx, "b", None).await;
		testing::follow(&ctx, with_token, merchant_id).await;
		testing::follow(&ctx, without_token, merchant_id).await;

		let merchant = model::merchant::Entity::find_by_id(merchant_id).one(ctx.db()).await.unwrap().unwrap();
		let promo = model::promo::Model {
			id: 1,
			merchant: merchant_id,
			name: "half price".into(),
			description: None,
			terms: None,
			instructions: None,
			starts: None,
			ends: None,
			created: chrono::Utc::now(),
		};
		ctx.announce_promo(&promo, &merchant).await;

		assert_eq!(model::notification::Entity::find().count(ctx.db()).await.unwrap(), 2);
		assert_eq!(model::delivery::Entity::find().count(ctx.db()).await.unwrap(), 3);
		let sent = sent.lock().unwrap();
		assert_eq!(sent.len(), 2);
		assert!(sent.iter().any(|(token, _)| token == "tok-a"));
		assert!(sent.iter().any(|(token, _)| token == "tok-owner"));

		drop(sent);
		let inbox = ctx.notifications_of(without_token, 0, 20, ctx.db()).await.unwrap();
		assert_eq!(inbox.len(), 1);
		assert_eq!(inbox[0].1.title, "New promo from warung");
		let owner_inbox = ctx.notifications_of(owner, 0, 20, ctx.db()).await.unwrap();
		assert_eq!(owner_inbox.len(), 1);
		assert_eq!(owner_inbox[0].1.title, "Promo published");
	}
}
