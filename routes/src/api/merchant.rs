use axum::{extract::{Multipart, Path, Query, State}, http::StatusCode, Json};
use lokanala::{model, traits::{merchant::MerchantDraft, Follows, Merchants, Products, Promos, Ratings}, Context};
use sea_orm::EntityTrait;

use crate::{builders::{self, Pagination, Reply}, upload, views::{CategoryView, FollowState, FollowersView, MerchantDetail, MerchantView, ProductView, PromoView}, ApiError, AuthIdentity};

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct MerchantFilter {
	pub category: Option<i64>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct PromoFilter {
	#[serde(default)]
	pub active: bool,
}

pub async fn categories(
	State(ctx): State<Context>,
) -> crate::ApiResult<Json<Reply<Vec<CategoryView>>>> {
	let items = ctx.merchant_categories(ctx.db())
		.await?
		.into_iter()
		.map(CategoryView::from)
		.collect();
	Ok(builders::ok("merchant categories", items))
}

pub async fn list(
	State(ctx): State<Context>,
	Query(filter): Query<MerchantFilter>,
	Query(page): Query<Pagination>,
) -> crate::ApiResult<Json<Reply<Vec<MerchantView>>>> {
	let (limit, offset) = page.pagination();
	let merchants = ctx.merchants(filter.category, offset, limit, ctx.db()).await?;
	let ids : Vec<i64> = merchants.iter().map(|(m, _)| m.id).collect();
	let ratings = ctx.merchant_ratings(&ids, ctx.db()).await?;
	let items = merchants
		.into_iter()
		.map(|(m, c)| {
			let rating = ratings.get(&m.id).copied().unwrap_or_default();
			MerchantView::new(m, c, rating)
		})
		.collect();
	Ok(builders::ok("merchants", items))
}

fn merchant_draft(form: &upload::Form) -> crate::ApiResult<MerchantDraft> {
	Ok(MerchantDraft {
		category: form.require("category")?,
		name: form.require("name")?,
		address: form.text("address"),
		phone: form.text("phone"),
		description: form.text("description"),
		location: form.text("location"),
		image: form.first_file(),
	})
}

pub async fn create(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	multipart: Multipart,
) -> crate::ApiResult<(StatusCode, Json<Reply<MerchantView>>)> {
	let owner = auth.required()?;
	let form = upload::collect(&ctx, multipart, "image", 1).await?;
	let draft = match merchant_draft(&form) {
		Ok(x) => x,
		Err(e) => return Err(form.abandon(&ctx, e).await),
	};
	// from here on the core takes care of the stored image
	let merchant = ctx.create_merchant(owner, draft).await?;
	let category = model::merchant_category::Entity::find_by_id(merchant.category).one(ctx.db()).await?;
	Ok(builders::created("merchant registered", MerchantView::new(merchant, category, Default::default())))
}

pub async fn view(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<MerchantDetail>>> {
	let (merchant, category) = model::merchant::Entity::find_by_id(id)
		.find_also_related(model::merchant_category::Entity)
		.one(ctx.db())
		.await?
		.ok_or_else(ApiError::not_found)?;

	let rating = ctx.merchant_rating(id, ctx.db()).await?;
	let promos = ctx.promos_of(id, true, ctx.db())
		.await?
		.into_iter()
		.map(PromoView::from)
		.collect();
	let ratings = ctx.product_ratings(id, ctx.db()).await?;
	let products = ctx.products_of(id, ctx.db())
		.await?
		.into_iter()
		.map(|p| {
			let rating = ratings.get(&p.id).copied().unwrap_or_default();
			ProductView::new(p, rating)
		})
		.collect();

	Ok(builders::ok("merchant", MerchantDetail {
		merchant: MerchantView::new(merchant, category, rating),
		promos,
		products,
	}))
}

pub async fn remove(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<()>>> {
	ctx.delete_merchant(id, auth.required()?).await?;
	Ok(builders::done("merchant deleted"))
}

pub async fn rating(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<lokanala::traits::rate::Rating>>> {
	Ok(builders::ok("merchant rating", ctx.merchant_rating(id, ctx.db()).await?))
}

pub async fn products(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<Vec<ProductView>>>> {
	let ratings = ctx.product_ratings(id, ctx.db()).await?;
	let items = ctx.products_of(id, ctx.db())
		.await?
		.into_iter()
		.map(|p| {
			let rating = ratings.get(&p.id).copied().unwrap_or_default();
			ProductView::new(p, rating)
		})
		.collect();
	Ok(builders::ok("merchant products", items))
}

pub async fn promos(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
	Query(filter): Query<PromoFilter>,
) -> crate::ApiResult<Json<Reply<Vec<PromoView>>>> {
	let items = ctx.promos_of(id, filter.active, ctx.db())
		.await?
		.into_iter()
		.map(PromoView::from)
		.collect();
	Ok(builders::ok("merchant promos", items))
}

pub async fn follow(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<(StatusCode, Json<Reply<FollowState>>)> {
	ctx.follow(auth.required()?, id, ctx.db()).await?;
	Ok(builders::created("merchant followed", FollowState { merchant: id, following: true }))
}

pub async fn unfollow(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<FollowState>>> {
	ctx.unfollow(auth.required()?, id, ctx.db()).await?;
	Ok(builders::ok("merchant unfollowed", FollowState { merchant: id, following: false }))
}

pub async fn following(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<FollowState>>> {
	let following = ctx.is_following(auth.required()?, id, ctx.db()).await?;
	Ok(builders::ok("follow state", FollowState { merchant: id, following }))
}

pub async fn followers(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<FollowersView>>> {
	let followers = ctx.followers_of(id, ctx.db()).await?;
	Ok(builders::ok("merchant followers", FollowersView {
		merchant: id,
		count: followers.len(),
		followers,
	}))
}
