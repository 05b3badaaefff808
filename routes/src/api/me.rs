use axum::{extract::{Query, State}, Json};
use lokanala::{traits::{Follows, Merchants, Notifier, Ratings}, Context};

use crate::{builders::{self, Pagination, Reply}, views::{FollowedView, MerchantView, NotificationView, PromoView}, AuthIdentity};

pub async fn notifications(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Query(page): Query<Pagination>,
) -> crate::ApiResult<Json<Reply<Vec<NotificationView>>>> {
	let user = auth.required()?;
	let (limit, offset) = page.pagination();
	let items = ctx.notifications_of(user, offset, limit, ctx.db())
		.await?
		.into_iter()
		.map(|(delivery, notification)| NotificationView::new(delivery, notification))
		.collect();
	Ok(builders::ok("notifications", items))
}

pub async fn merchants(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
) -> crate::ApiResult<Json<Reply<Vec<MerchantView>>>> {
	let user = auth.required()?;
	let merchants = ctx.merchants_of(user, ctx.db()).await?;
	let ids : Vec<i64> = merchants.iter().map(|m| m.id).collect();
	let ratings = ctx.merchant_ratings(&ids, ctx.db()).await?;
	let items = merchants
		.into_iter()
		.map(|m| {
			let rating = ratings.get(&m.id).copied().unwrap_or_default();
			MerchantView::new(m, None, rating)
		})
		.collect();
	Ok(builders::ok("your merchants", items))
}

pub async fn following(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
) -> crate::ApiResult<Json<Reply<Vec<FollowedView>>>> {
	let user = auth.required()?;
	let followed = ctx.followed_merchants_of(user, ctx.db()).await?;
	let ids : Vec<i64> = followed.iter().map(|f| f.merchant.id).collect();
	let ratings = ctx.merchant_ratings(&ids, ctx.db()).await?;
	let items = followed
		.into_iter()
		.map(|f| {
			let rating = ratings.get(&f.merchant.id).copied().unwrap_or_default();
			FollowedView {
				merchant: MerchantView::new(f.merchant, f.category, rating),
				active_promos: f.active_promos.into_iter().map(PromoView::from).collect(),
			}
		})
		.collect();
	Ok(builders::ok("followed merchants", items))
}
