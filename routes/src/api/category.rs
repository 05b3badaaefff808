use axum::{extract::{Path, State}, http::StatusCode, Json};
use lokanala::{traits::Categories, Context};

use crate::{builders::{self, Reply}, views::ProductCategoryView, AuthIdentity};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CategoryForm {
	merchant: i64,
	name: String,
	description: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CategoryEdit {
	name: Option<String>,
	description: Option<String>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Position {
	id: i64,
	position: i32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrderForm {
	order: Vec<Position>,
}

pub async fn list(
	State(ctx): State<Context>,
	Path(merchant): Path<i64>,
) -> crate::ApiResult<Json<Reply<Vec<ProductCategoryView>>>> {
	let items = ctx.categories_of(merchant, ctx.db())
		.await?
		.into_iter()
		.map(ProductCategoryView::from)
		.collect();
	Ok(builders::ok("product categories", items))
}

pub async fn create(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Json(form): Json<CategoryForm>,
) -> crate::ApiResult<(StatusCode, Json<Reply<ProductCategoryView>>)> {
	let category = ctx.create_category(form.merchant, auth.required()?, &form.name, form.description).await?;
	Ok(builders::created("category created", category.into()))
}

pub async fn update(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
	Json(form): Json<CategoryEdit>,
) -> crate::ApiResult<Json<Reply<ProductCategoryView>>> {
	let category = ctx.update_category(id, auth.required()?, form.name, form.description).await?;
	Ok(builders::ok("category updated", category.into()))
}

pub async fn remove(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<()>>> {
	ctx.delete_category(id, auth.required()?).await?;
	Ok(builders::done("category deleted"))
}

pub async fn reorder(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(merchant): Path<i64>,
	Json(form): Json<OrderForm>,
) -> crate::ApiResult<Json<Reply<Vec<ProductCategoryView>>>> {
	let order : Vec<(i64, i32)> = form.order.iter().map(|p| (p.id, p.position)).collect();
	ctx.reorder_categories(merchant, auth.required()?, &order).await?;
	let items = ctx.categories_of(merchant, ctx.db())
		.await?
		.into_iter()
		.map(ProductCategoryView::from)
		.collect();
	Ok(builders::ok("categories reordered", items))
}
