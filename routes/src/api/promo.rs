use axum::{extract::{Path, State}, http::StatusCode, Json};
use lokanala::{model, traits::{promo::{PromoDraft, PromoEdit}, Promos}, Context};
use sea_orm::EntityTrait;

use crate::{builders::{self, Reply}, views::PromoView, ApiError, AuthIdentity};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PromoForm {
	name: String,
	description: Option<String>,
	terms: Option<String>,
	instructions: Option<String>,
	starts: Option<chrono::NaiveDate>,
	ends: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PromoPatch {
	name: Option<String>,
	description: Option<String>,
	terms: Option<String>,
	instructions: Option<String>,
	starts: Option<chrono::NaiveDate>,
	ends: Option<chrono::NaiveDate>,
}

pub async fn create(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(merchant): Path<i64>,
	Json(form): Json<PromoForm>,
) -> crate::ApiResult<(StatusCode, Json<Reply<PromoView>>)> {
	let promo = ctx.create_promo(merchant, auth.required()?, PromoDraft {
		name: form.name,
		description: form.description,
		terms: form.terms,
		instructions: form.instructions,
		starts: form.starts,
		ends: form.ends,
	}).await?;
	Ok(builders::created("promo published", promo.into()))
}

pub async fn view(
	State(ctx): State<Context>,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<PromoView>>> {
	let promo = model::promo::Entity::find_by_id(id)
		.one(ctx.db())
		.await?
		.ok_or_else(ApiError::not_found)?;
	Ok(builders::ok("promo", promo.into()))
}

pub async fn update(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
	Json(form): Json<PromoPatch>,
) -> crate::ApiResult<Json<Reply<PromoView>>> {
	let promo = ctx.update_promo(id, auth.required()?, PromoEdit {
		name: form.name,
		description: form.description,
		terms: form.terms,
		instructions: form.instructions,
		starts: form.starts,
		ends: form.ends,
	}).await?;
	Ok(builders::ok("promo updated", promo.into()))
}

pub async fn remove(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<()>>> {
	ctx.delete_promo(id, auth.required()?).await?;
	Ok(builders::done("promo deleted"))
}
