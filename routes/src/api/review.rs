use axum::{extract::{Multipart, Path, State}, http::StatusCode, Json};
use lokanala::{traits::{review::ReviewEdit, Reviewer}, Context};

use crate::{builders::{self, Reply}, upload, views::ReviewView, AuthIdentity};

fn review_target(form: &upload::Form) -> crate::ApiResult<(i64, i32)> {
	Ok((form.require("product")?, form.require("rating")?))
}

pub async fn create(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	multipart: Multipart,
) -> crate::ApiResult<(StatusCode, Json<Reply<ReviewView>>)> {
	let user = auth.required()?;
	let form = upload::collect(&ctx, multipart, "photo", ctx.cfg().storage.max_review_photos).await?;
	let (product, rating) = match review_target(&form) {
		Ok(x) => x,
		Err(e) => return Err(form.abandon(&ctx, e).await),
	};
	let review = ctx.add_review(product, user, rating, form.text("comment"), form.files().to_vec()).await?;
	Ok(builders::created("review published", review.into()))
}

pub async fn update(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
	multipart: Multipart,
) -> crate::ApiResult<Json<Reply<ReviewView>>> {
	let user = auth.required()?;
	let form = upload::collect(&ctx, multipart, "photo", ctx.cfg().storage.max_review_photos).await?;
	let rating = match form.parse::<i32>("rating") {
		Ok(x) => x,
		Err(e) => return Err(form.abandon(&ctx, e).await),
	};
	let edit = ReviewEdit {
		rating,
		comment: form.text("comment"),
		keep_photos: form.all("keep_photos"),
		new_photos: form.files().to_vec(),
	};
	let review = ctx.update_review(id, user, edit).await?;
	Ok(builders::ok("review updated", review.into()))
}

pub async fn remove(
	State(ctx): State<Context>,
	AuthIdentity(auth): AuthIdentity,
	Path(id): Path<i64>,
) -> crate::ApiResult<Json<Reply<()>>> {
	ctx.delete_review(id, auth.required()?).await?;
	Ok(builders::done("review deleted"))
}
