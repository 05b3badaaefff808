use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{errors::{ServiceError, ServiceResult}, ext::AnyQuery, model};

/// A followed merchant as shown in a user's following list.
#[derive(Debug, Clone)]
pub struct Followed {
	pub merchant: model::merchant::Model,
	pub category: Option<model::merchant_category::Model>,
	pub active_promos: Vec<model::promo::Model>,
}

#[allow(async_fn_in_trait)]
pub trait Follows {
	async fn follow(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> ServiceResult<model::follow::Model>;
	async fn unfollow(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> ServiceResult<()>;
	async fn is_following(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> Result<bool, DbErr>;
	async fn followers_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<i64>, DbErr>;
	async fn followed_merchants_of(&self, user: i64, tx: &impl ConnectionTrait) -> Result<Vec<Followed>, DbErr>;
}

impl Follows for crate::Context {
	async fn follow(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> ServiceResult<model::follow::Model> {
		if !model::merchant::Entity::find_by_id(merchant).any(tx).await? {
			return Err(ServiceError::NotFound("merchant"));
		}

		if model::follow::Entity::find_edge(user, merchant).any(tx).await? {
			return Err(ServiceError::conflict("already following this merchant"));
		}

		let edge = model::follow::ActiveModel {
			id: NotSet,
			user: Set(user),
			merchant: Set(merchant),
			created: Set(chrono::Utc::now()),
		}
			.insert(tx)
			.await
			.map_err(|e| ServiceError::on_insert(e, "already following this merchant"))?;

		tracing::debug!("user #{user} now follows merchant #{merchant}");
		Ok(edge)
	}

	async fn unfollow(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> ServiceResult<()> {
		let edge = model::follow::Entity::find_edge(user, merchant)
			.one(tx)
			.await?
			.ok_or(ServiceError::NotFound("follow"))?;
		edge.delete(tx).await?;
		Ok(())
	}

	async fn is_following(&self, user: i64, merchant: i64, tx: &impl ConnectionTrait) -> Result<bool, DbErr> {
		model::follow::Entity::find_edge(user, merchant).any(tx).await
	}

	async fn followers_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<i64>, DbErr> {
		model::follow::Entity::find()
			.filter(model::follow::Column::Merchant.eq(merchant))
			.order_by_asc(model::follow::Column::Id)
			.select_only()
			.column(model::follow::Column::User)
			.into_tuple::<i64>()
			.all(tx)
			.await
	}

	async fn followed_merchants_of(&self, user: i64, tx: &impl ConnectionTrait) -> Result<Vec<Followed>, DbErr> {
		let merchants = model::merchant::Entity::find()
			.inner_join(model::follow::Entity)
			.filter(model::follow::Column::User.eq(user))
			.order_by_desc(model::follow::Column::Created)
			.find_also_related(model::merchant_category::Entity)
			.all(tx)
			.await?;

		let today = chrono::Utc::now().date_naive();
		let ids : Vec<i64> = merchants.iter().map(|(m, _)| m.id).collect();
		let promos = model::promo::Entity::find_active(today)
			.filter(model::promo::Column::Merchant.is_in(ids))
			.order_by_desc(model::promo::Column::Created)
			.all(tx)
			.await?;

		Ok(
			merchants
				.into_iter()
				.map(|(merchant, category)| Followed {
					active_promos: promos.iter().filter(|p| p.merchant == merchant.id).cloned().collect(),
					merchant,
					category,
				})
				.collect()
		)
	}
}

#[cfg(test)]
mod test {
	use super::Follows;
	use crate::{errors::ServiceError, testing};

	#[tokio::test]
	async fn follow_edges_are_unique() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let fan = testing::user(&ctx, "fan", None).await;

		assert!(!ctx.is_following(fan, merchant, ctx.db()).await.unwrap());
		ctx.follow(fan, merchant, ctx.db()).await.unwrap();
		assert!(ctx.is_following(fan, merchant, ctx.db()).await.unwrap());
		assert!(matches!(ctx.follow(fan, merchant, ctx.db()).await, Err(ServiceError::Conflict(_))));
		assert_eq!(ctx.followers_of(merchant, ctx.db()).await.unwrap(), vec![fan]);

		ctx.unfollow(fan, merchant, ctx.db()).await.unwrap();
		assert!(!ctx.is_following(fan, merchant, ctx.db()).await.unwrap());
		assert!(matches!(ctx.unfollow(fan, merchant, ctx.db()).await, Err(ServiceError::NotFound(_))));
		assert!(ctx.followers_of(merchant, ctx.db()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn following_unknown_merchant_is_not_found() {
		let (ctx, _) = testing::context().await;
		let fan = testing::user(&ctx, "fan", None).await;
		assert!(matches!(ctx.follow(fan, 777, ctx.db()).await, Err(ServiceError::NotFound("merchant"))));
	}

	#[tokio::test]
	async fn followed_merchants_list_active_promos_only() {
		use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}};

		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let fan = testing::user(&ctx, "fan", None).await;
		ctx.follow(fan, merchant, ctx.db()).await.unwrap();

		let today = chrono::Utc::now().date_naive();
		for (name, starts, ends) in [
			("running", None, None),
			("expired", None, Some(today - chrono::Duration::days(1))),
			("upcoming", Some(today + chrono::Duration::days(1)), None),
		] {
			crate::model::promo::ActiveModel {
				id: NotSet,
				merchant: Set(merchant),
				name: Set(name.to_string()),
				description: Set(None),
				terms: Set(None),
				instructions: Set(None),
				starts: Set(starts),
				ends: Set(ends),
				created: Set(chrono::Utc::now()),
			}
				.insert(ctx.db())
				.await
				.unwrap();
		}

		let followed = ctx.followed_merchants_of(fan, ctx.db()).await.unwrap();
		assert_eq!(followed.len(), 1);
		assert_eq!(followed[0].merchant.id, merchant);
		assert!(followed[0].category.is_some());
		let names : Vec<&str> = followed[0].active_promos.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["running"]);
	}
}
