use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{ext::round1, model};

/// Aggregate of a set of reviews. Never absent: no reviews means zero mean and count.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Rating {
	pub mean: f64,
	pub count: u64,
}

impl Rating {
	pub fn from_totals(count: i64, sum: Option<i64>) -> Self {
		let count = count.max(0) as u64;
		match (count, sum) {
			(0, _) | (_, None) => Rating::default(),
			(count, Some(sum)) => Rating {
				mean: round1(sum as f64 / count as f64),
				count,
			},
		}
	}
}

#[allow(async_fn_in_trait)]
pub trait Ratings {
	async fn product_rating(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Rating, DbErr>;
	async fn merchant_rating(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Rating, DbErr>;
	/// ratings of every reviewed product of a merchant, keyed by product
	async fn product_ratings(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<HashMap<i64, Rating>, DbErr>;
	/// ratings of many merchants at once, keyed by merchant
	async fn merchant_ratings(&self, merchants: &[i64], tx: &impl ConnectionTrait) -> Result<HashMap<i64, Rating>, DbErr>;
	async fn top_review(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Option<model::review::Model>, DbErr>;
}

impl Ratings for crate::Context {
	async fn product_rating(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Rating, DbErr> {
		let (count, sum) = model::review::Entity::find()
			.select_only()
			.column_as(model::review::Column::Id.count(), "count")
			.column_as(model::review::Column::Rating.sum(), "sum")
			.filter(model::review::Column::Product.eq(product))
			.into_tuple::<(i64, Option<i64>)>()
			.one(tx)
			.await?
			.unwrap_or((0, None));

		Ok(Rating::from_totals(count, sum))
	}

	async fn merchant_rating(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Rating, DbErr> {
		let (count, sum) = model::review::Entity::find()
			.select_only()
			.column_as(model::review::Column::Id.count(), "count")
			.column_as(model::review::Column::Rating.sum(), "sum")
			.inner_join(model::product::Entity)
			.filter(model::product::Column::Merchant.eq(merchant))
			.into_tuple::<(i64, Option<i64>)>()
			.one(tx)
			.await?
			.unwrap_or((0, None));

		Ok(Rating::from_totals(count, sum))
	}

	async fn product_ratings(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<HashMap<i64, Rating>, DbErr> {
		Ok(
			model::review::Entity::find()
				.select_only()
				.column(model::review::Column::Product)
				.column_as(model::review::Column::Id.count(), "count")
				.column_as(model::review::Column::Rating.sum(), "sum")
				.inner_join(model::product::Entity)
				.filter(model::product::Column::Merchant.eq(merchant))
				.group_by(model::review::Column::Product)
				.into_tuple::<(i64, i64, Option<i64>)>()
				.all(tx)
				.await?
				.into_iter()
				.map(|(product, count, sum)| (product, Rating::from_totals(count, sum)))
				.collect()
		)
	}

	async fn merchant_ratings(&self, merchants: &[i64], tx: &impl ConnectionTrait) -> Result<HashMap<i64, Rating>, DbErr> {
		if merchants.is_empty() {
			return Ok(HashMap::new());
		}

		Ok(
			model::review::Entity::find()
				.select_only()
				.column(model::product::Column::Merchant)
				.column_as(model::review::Column::Id.count(), "count")
				.column_as(model::review::Column::Rating.sum(), "sum")
				.inner_join(model::product::Entity)
				.filter(model::product::Column::Merchant.is_in(merchants.iter().copied()))
				.group_by(model::product::Column::Merchant)
				.into_tuple::<(i64, i64, Option<i64>)>()
				.all(tx)
				.await?
				.into_iter()
				.map(|(merchant, count, sum)| (merchant, Rating::from_totals(count, sum)))
				.collect()
		)
	}

	async fn top_review(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Option<model::review::Model>, DbErr> {
		model::review::Entity::find()
			.filter(model::review::Column::Product.eq(product))
			.order_by_desc(model::review::Column::Rating)
			.order_by_desc(model::review::Column::Published)
			.one(tx)
			.await
	}
}

#[cfg(test)]
mod test {
	use super::{Rating, Ratings};
	use crate::testing;

	#[test]
	fn empty_totals_are_zero_not_missing() {
		assert_eq!(Rating::from_totals(0, None), Rating { mean: 0.0, count: 0 });
		assert_eq!(Rating::from_totals(3, Some(14)), Rating { mean: 4.7, count: 3 });
		assert_eq!(Rating::from_totals(2, Some(7)), Rating { mean: 3.5, count: 2 });
	}

	#[tokio::test]
	async fn unreviewed_product_and_unknown_ids_rate_zero() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let product = testing::product(&ctx, merchant, "kopi").await;

		assert_eq!(ctx.product_rating(product, ctx.db()).await.unwrap(), Rating::default());
		assert_eq!(ctx.product_rating(9999, ctx.db()).await.unwrap(), Rating::default());
		assert_eq!(ctx.merchant_rating(merchant, ctx.db()).await.unwrap(), Rating::default());
		assert_eq!(ctx.merchant_rating(9999, ctx.db()).await.unwrap(), Rating::default());
	}

	#[tokio::test]
	async fn product_rating_is_rounded_mean() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let product = testing::product(&ctx, merchant, "kopi").await;
		for (i, rating) in [5, 4, 5].into_iter().enumerate() {
			let reviewer = testing::user(&ctx, &format!("reviewer{i}"), None).await;
			testing::review(&ctx, product, reviewer, rating).await;
		}

		assert_eq!(ctx.product_rating(product, ctx.db()).await.unwrap(), Rating { mean: 4.7, count: 3 });
	}

	#[tokio::test]
	async fn merchant_rating_spans_all_products() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let other = testing::merchant(&ctx, owner, "toko").await;
		let kopi = testing::product(&ctx, merchant, "kopi").await;
		let teh = testing::product(&ctx, merchant, "teh").await;
		let unrelated = testing::product(&ctx, other, "roti").await;
		let a = testing::user(&ctx, "a", None).await;
		let b = testing::user(&ctx, "b", None).await;
		testing::review(&ctx, kopi, a, 5).await;
		testing::review(&ctx, teh, a, 3).await;
		testing::review(&ctx, teh, b, 3).await;
		testing::review(&ctx, unrelated, b, 1).await;

		assert_eq!(ctx.merchant_rating(merchant, ctx.db()).await.unwrap(), Rating { mean: 3.7, count: 3 });

		let per_product = ctx.product_ratings(merchant, ctx.db()).await.unwrap();
		assert_eq!(per_product.len(), 2);
		assert_eq!(per_product[&kopi], Rating { mean: 5.0, count: 1 });
		assert_eq!(per_product[&teh], Rating { mean: 3.0, count: 2 });

		let per_merchant = ctx.merchant_ratings(&[merchant, other], ctx.db()).await.unwrap();
		assert_eq!(per_merchant[&merchant], Rating { mean: 3.7, count: 3 });
		assert_eq!(per_merchant[&other], Rating { mean: 1.0, count: 1 });
	}

	#[tokio::test]
	async fn top_review_prefers_highest_rating() {
		let (ctx, _) = testing::context().await;
		let owner = testing::user(&ctx, "owner", None).await;
		let merchant = testing::merchant(&ctx, owner, "warung").await;
		let product = testing::product(&ctx, merchant, "kopi").await;
		assert!(ctx.top_review(product, ctx.db()).await.unwrap().is_none());
		let a = testing::user(&ctx, "a", None).await;
		let b = testing::user(&ctx, "b", None).await;
		testing::review(&ctx, product, a, 2).await;
		let best = testing::review(&ctx, product, b, 5).await;
		assert_eq!(ctx.top_review(product, ctx.db()).await.unwrap().map(|x| x.id), Some(best));
	}
}
