use axum::{extract::{Multipart, Path, State}, http::StatusCode, Json};
use lokanala::{traits::{product::{ProductDraft, ProductEdit}, Products, Ratings, Reviewer}, Context};

use crate::{builders::{self, Reply}, upload, views::{ProductDetail, ProductView, ReviewView}, ApiError, AuthIdentity};

fn product_draft(form: &upload::Form) -> crate::ApiResult<ProductDraft> {
	Ok(ProductDraft {
		merchant: form.require("merchant")?,
		category: form.parse("category")?,
		name: form.require("name")?,
		description: form.text("description"),
		price: form.require("price")?,
		image: form.first_file(),
	})
}

fn product_edit(form: &upload::Form) -> crate::ApiResult<ProductEdit> {
	Ok(ProductEdit {
		category: form.parse("category")?,
		name: form.text("name"),
		description: form.text("description"),
		price: form.parse("price")?,
		image: form.first_file(),
	})
}

pub async fn create(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	multipart: Multipart,
) -> crate::ApiResult<(StatusCode, Json<Reply<ProductView>>)> {
	let user = auth.required()?;
	let form = upload::collect(&ctx, multipart, "image", 1).await?;
	let draft = match product_draft(&form) {
		Ok(x) => x,
		Err(e) => return Err(form.abandon(&ctx, e).await),
	};
	let product = ctx.create_product(user, draft).await?;
	Ok(builders::created("product added", ProductView::new(product, Default::default())))
}

pub async fn view(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<ProductDetail>>> {
	let (product, merchant) = ctx.product(id, ctx.db())
		.await?
		.ok_or_else(ApiError::not_found)?;
	let rating = ctx.product_rating(id, ctx.db()).await?;
	let top_review = ctx.top_review(id, ctx.db()).await?.map(ReviewView::from);
	Ok(builders::ok("product", ProductDetail {
		product: ProductView::new(product, rating),
		merchant_name: merchant.map(|m| m.name),
		top_review,
	}))
}

pub async fn update(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
	multipart: Multipart,
) -> crate::ApiResult<Json<Reply<ProductView>>> {
	let user = auth.required()?;
	let form = upload::collect(&ctx, multipart, "image", 1).await?;
	let edit = match product_edit(&form) {
		Ok(x) => x,
		Err(e) => return Err(form.abandon(&ctx, e).await),
	};
	let product = ctx.update_product(id, user, edit).await?;
	let rating = ctx.product_rating(id, ctx.db()).await?;
	Ok(builders::ok("product updated", ProductView::new(product, rating)))
}

pub async fn remove(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<()>>> {
	ctx.delete_product(id, auth.required()?).await?;
	Ok(builders::done("product deleted"))
}

pub async fn rating(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<lokanala::traits::rate::Rating>>> {
	Ok(builders::ok("product rating", ctx.product_rating(id, ctx.db()).await?))
}

pub async fn reviews(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<Vec<ReviewView>>>> {
	let items = ctx.reviews_of(id, ctx.db())
		.await?
		.into_iter()
		.map(|(review, author)| ReviewView::new(review, author))
		.collect();
	Ok(builders::ok("product reviews", items))
}
