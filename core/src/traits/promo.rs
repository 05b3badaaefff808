use sea_orm::{prelude::ChronoDate, ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder};

use crate::{errors::{ServiceError, ServiceResult}, model, traits::{category::ensure_owner, Notifier}};

#[derive(Debug, Clone, Default)]
pub struct PromoDraft {
	pub name: String,
	pub description: Option<String>,
	pub terms: Option<String>,
	pub instructions: Option<String>,
	pub starts: Option<ChronoDate>,
	pub ends: Option<ChronoDate>,
}

#[derive(Debug, Clone, Default)]
pub struct PromoEdit {
	pub name: Option<String>,
	pub description: Option<String>,
	pub terms: Option<String>,
	pub instructions: Option<String>,
	pub starts: Option<ChronoDate>,
	pub ends: Option<ChronoDate>,
}

fn validate_window(starts: Option<ChronoDate>, ends: Option<ChronoDate>) -> ServiceResult<()> {
	if let (Some(starts), Some(ends)) = (starts, ends) {
		if ends < starts {
			return Err(ServiceError::invalid("promo can't end before it starts"));
		}
	}
	Ok(())
}

#[allow(async_fn_in_trait)]
pub trait Promos {
	/// publish a promo and announce it to the merchant followers
	async fn create_promo(&self, merchant: i64, requester: i64, draft: PromoDraft) -> ServiceResult<model::promo::Model>;
	async fn update_promo(&self, promo: i64, requester: i64, edit: PromoEdit) -> ServiceResult<model::promo::Model>;
	async fn delete_promo(&self, promo: i64, requester: i64) -> ServiceResult<()>;
	async fn promos_of(&self, merchant: i64, active_only: bool, tx: &impl ConnectionTrait) -> Result<Vec<model::promo::Model>, DbErr>;
}

impl Promos for crate::Context {
	async fn create_promo(&self, merchant: i64, requester: i64, draft: PromoDraft) -> ServiceResult<model::promo::Model> {
		let name = draft.name.trim();
		if name.is_empty() {
			return Err(ServiceError::invalid("promo name can't be empty"));
		}
		validate_window(draft.starts, draft.ends)?;

		let merchant = model::merchant::Entity::find_by_id(merchant)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("merchant"))?;
		if merchant.owner != requester {
			return Err(ServiceError::Forbidden);
		}

		let promo = model::promo::ActiveModel {
			id: NotSet,
			merchant: Set(merchant.id),
			name: Set(name.to_string()),
			description: Set(draft.description),
			terms: Set(draft.terms),
			instructions: Set(draft.instructions),
			starts: Set(draft.starts),
			ends: Set(draft.ends),
			created: Set(chrono::Utc::now()),
		}
			.insert(self.db())
			.await?;

		tracing::info!("merchant #{} published promo #{} '{}'", merchant.id, promo.id, promo.name);
		self.announce_promo(&promo, &merchant).await;
		Ok(promo)
	}

	async fn update_promo(&self, promo: i64, requester: i64, edit: PromoEdit) -> ServiceResult<model::promo::Model> {
		let promo = model::promo::Entity::find_by_id(promo)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("promo"))?;
		ensure_owner(promo.merchant, requester, self.db()).await?;

		validate_window(edit.starts.or(promo.starts), edit.ends.or(promo.ends))?;

		let mut model = promo.into_active_model();
		if let Some(name) = edit.name {
			let name = name.trim();
			if name.is_empty() {
				return Err(ServiceError::invalid("promo name can't be empty"));
			}
			model.name = Set(name.to_string());
		}
		if let Some(description) = edit.description {
			model.description = Set(Some(description));
		}
		if let Some(terms) = edit.terms {
			model.terms = Set(Some(terms));
		}
		if let Some(instructions) = edit.instructions {
			model.instructions = Set(Some(instructions));
		}
		if let Some(starts) = edit.starts {
			model.starts = Set(Some(starts));
		}
		if let Some(ends) = edit.ends {
			model.ends = Set(Some(ends));
		}

		Ok(model.update(self.db()).await?)
	}

	async fn delete_promo(&self, promo: i64, requester: i64) -> ServiceResult<()> {
		let promo = model::promo::Entity::find_by_id(promo)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("promo"))?;
		ensure_owner(promo.merchant, requester, self.db()).await?;
		promo.delete(self.db()).await?;
		Ok(())
	}

	async fn promos_of(&self, merchant: i64, active_only: bool, tx: &impl ConnectionTrait) -> Result<Vec<model::promo::Model>, DbErr> {
		let select = if active_only {
			model::promo::Entity::find_active(chrono::Utc::now().date_naive())
		} else {
			model::promo::Entity::find()
		};
		select
			.filter(model::promo::Column::Merchant.eq(merchant))
			.order_by_desc(model::promo::Column::Created)
			.order_by_desc(model::promo::Column::Id)
			.all(tx)
			.await
	}
}

#[cfg(test)]
mod test {
	use sea_orm::{EntityTrait, PaginatorTrait};

	use super::{PromoDraft, PromoEdit, Promos};
	use crate::{errors::ServiceError, model, testing};

	fn date(y: i32, m: u32, d: u32) -> Option<sea_orm::prelude::ChronoDate> {
		chrono::NaiveDate::from_ymd_opt(y, m, d)
	}

	#[tokio::test]
	async fn promo_reaches_followers_and_owner() {
		let (ctx, sent) = testing::context().await;
		let owner = testing::user(&ctx, "owner", Some("tok-owner")).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let with_token = testing::user(&ctx, "a", Some("tok-a")).await;
		let without_token = testing::user(&ctx, "b", None).await;
		testing::follow(&ctx, with_token, merchant).await;
		testing::follow(&ctx, without_token, merchant).await;

		ctx.create_promo(merchant, owner, PromoDraft { name: "half price".into(), ..Default::default() }).await.unwrap();

		assert_eq!(model::promo::Entity::find().count(ctx.db()).await.unwrap(), 1);
		assert_eq!(model::notification::Entity::find().count(ctx.db()).await.unwrap(), 2);
		assert_eq!(model::delivery::Entity::find().count(ctx.db()).await.unwrap(), 3);
		assert_eq!(sent.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn push_failures_dont_fail_the_promo() {
		let mut push = testing::MockPush::default();
		push.failing.insert("tok-a".into());
		push.failing.insert("tok-owner".into());
		let ctx = testing::context_with(push).await;
		let owner = testing::user(&ctx, "owner", Some("tok-owner")).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let fan = testing::user(&ctx, "a", Some("tok-a")).await;
		testing::follow(&ctx, fan, merchant).await;

		let promo = ctx.create_promo(merchant, owner, PromoDraft { name: "flash sale".into(), ..Default::default() }).await;
		assert!(promo.is_ok());
		assert_eq!(model::delivery::Entity::find().count(ctx.db()).await.unwrap(), 2);
	}

	#[tokio::test]
	async fn window_and_ownership_are_checked() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let stranger = testing::user(&ctx, "stranger", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;

		let backwards = PromoDraft { name: "oops".into(), starts: date(2025, 5, 2), ends: date(2025, 5, 1), ..Default::default() };
		assert!(matches!(ctx.create_promo(merchant, owner, backwards).await, Err(ServiceError::Validation(_))));
		let draft = PromoDraft { name: "ok".into(), starts: date(2025, 5, 1), ends: date(2025, 5, 31), ..Default::default() };
		assert!(matches!(ctx.create_promo(merchant, stranger, draft.clone()).await, Err(ServiceError::Forbidden)));
		assert!(matches!(ctx.create_promo(4242, owner, draft.clone()).await, Err(ServiceError::NotFound(_))));

		let promo = ctx.create_promo(merchant, owner, draft).await.unwrap();
		let shrink = PromoEdit { ends: date(2025, 4, 1), ..Default::default() };
		assert!(matches!(ctx.update_promo(promo.id, owner, shrink).await, Err(ServiceError::Validation(_))));
		let rename = PromoEdit { name: Some("renamed".into()), ..Default::default() };
		assert_eq!(ctx.update_promo(promo.id, owner, rename).await.unwrap().name, "renamed");

		assert_eq!(ctx.promos_of(merchant, false, ctx.db()).await.unwrap().len(), 1);
		// may 2025 is long gone
		assert!(ctx.promos_of(merchant, true, ctx.db()).await.unwrap().is_empty());

		assert!(matches!(ctx.delete_promo(promo.id, stranger).await, Err(ServiceError::Forbidden)));
		ctx.delete_promo(promo.id, owner).await.unwrap();
		assert!(ctx.promos_of(merchant, false, ctx.db()).await.unwrap().is_empty());
	}
}
