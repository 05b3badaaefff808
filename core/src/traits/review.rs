use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder};

use crate::{errors::{ServiceError, ServiceResult}, ext::AnyQuery, model, traits::Notifier};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn validate_rating(rating: i32) -> ServiceResult<()> {
	if !(MIN_RATING..=MAX_RATING).contains(&rating) {
		return Err(ServiceError::invalid(format!("rating must be between {MIN_RATING} and {MAX_RATING}")));
	}
	Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ReviewEdit {
	pub rating: Option<i32>,
	pub comment: Option<String>,
	/// previously stored photos to keep, either bare names or full urls
	pub keep_photos: Vec<String>,
	/// freshly stored photos to append
	pub new_photos: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait Reviewer {
	/// photos must already be stored, they get discarded if the review can't be created
	async fn add_review(&self, product: i64, user: i64, rating: i32, comment: Option<String>, photos: Vec<String>) -> ServiceResult<model::review::Model>;
	async fn update_review(&self, review: i64, author: i64, edit: ReviewEdit) -> ServiceResult<model::review::Model>;
	async fn delete_review(&self, review: i64, author: i64) -> ServiceResult<()>;
	async fn reviews_of(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Vec<(model::review::Model, Option<model::user::Model>)>, DbErr>;
}

impl Reviewer for crate::Context {
	async fn add_review(&self, product: i64, user: i64, rating: i32, comment: Option<String>, photos: Vec<String>) -> ServiceResult<model::review::Model> {
		match insert_review(self, product, user, rating, comment, &photos).await {
			Ok((review, product, merchant)) => {
				tracing::info!("user #{user} reviewed product #{} with {rating} stars", product.id);
				self.announce_review(&review, &product, &merchant).await;
				Ok(review)
			},
			Err(e) => {
				self.storage().discard_all(&photos).await;
				Err(e)
			},
		}
	}

	async fn update_review(&self, review: i64, author: i64, edit: ReviewEdit) -> ServiceResult<model::review::Model> {
		match edit_review(self, review, author, &edit).await {
			Ok((updated, dropped)) => {
				self.storage().discard_all(&dropped).await;
				Ok(updated)
			},
			Err(e) => {
				self.storage().discard_all(&edit.new_photos).await;
				Err(e)
			},
		}
	}

	async fn delete_review(&self, review: i64, author: i64) -> ServiceResult<()> {
		let review = model::review::Entity::find_by_id(review)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("review"))?;

		if review.user != author {
			return Err(ServiceError::Forbidden);
		}

		let photos = review.photos();
		review.delete(self.db()).await?;
		self.storage().discard_all(&photos).await;
		Ok(())
	}

	async fn reviews_of(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Vec<(model::review::Model, Option<model::user::Model>)>, DbErr> {
		model::review::Entity::find()
			.filter(model::review::Column::Product.eq(product))
			.find_also_related(model::user::Entity)
			.order_by_desc(model::review::Column::Published)
			.order_by_desc(model::review::Column::Id)
			.all(tx)
			.await
	}
}

async fn insert_review(
	ctx: &crate::Context,
	product: i64,
	user: i64,
	rating: i32,
	comment: Option<String>,
	photos: &[String],
) -> ServiceResult<(model::review::Model, model::product::Model, model::merchant::Model)> {
	validate_rating(rating)?;

	let max_photos = ctx.cfg().storage.max_review_photos;
	if photos.len() > max_photos {
		return Err(ServiceError::invalid(format!("at most {max_photos} photos per review")));
	}

	if model::review::Entity::find_by_product_user(product, user).any(ctx.db()).await? {
		return Err(ServiceError::conflict("product already reviewed by this user"));
	}

	let (product, merchant) = model::product::Entity::find_by_id(product)
		.find_also_related(model::merchant::Entity)
		.one(ctx.db())
		.await?
		.ok_or(ServiceError::NotFound("product"))?;
	let merchant = merchant.ok_or(ServiceError::NotFound("merchant"))?;

	let review = model::review::ActiveModel {
		id: NotSet,
		product: Set(product.id),
		user: Set(user),
		rating: Set(rating),
		comment: Set(comment.unwrap_or_default()),
		photos: Set(model::join_files(photos)),
		published: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await
		.map_err(|e| ServiceError::on_insert(e, "product already reviewed by this user"))?;

	Ok((review, product, merchant))
}

/// returns the updated review and the stored photos it no longer references
async fn edit_review(ctx: &crate::Context, review: i64, author: i64, edit: &ReviewEdit) -> ServiceResult<(model::review::Model, Vec<String>)> {
	let review = model::review::Entity::find_by_id(review)
		.one(ctx.db())
		.await?
		.ok_or(ServiceError::NotFound("review"))?;

	if review.user != author {
		return Err(ServiceError::Forbidden);
	}

	if let Some(rating) = edit.rating {
		validate_rating(rating)?;
	}

	let current = review.photos();
	// clients may echo back full urls, only the trailing filename matters
	let mut kept : Vec<String> = Vec::new();
	for name in edit.keep_photos.iter().filter_map(|x| x.rsplit('/').next()) {
		if current.iter().any(|c| c == name) && !kept.iter().any(|k| k == name) {
			kept.push(name.to_string());
		}
	}
	let dropped : Vec<String> = current
		.into_iter()
		.filter(|c| !kept.contains(c))
		.collect();

	let photos : Vec<String> = kept.into_iter().chain(edit.new_photos.iter().cloned()).collect();
	let max_photos = ctx.cfg().storage.max_review_photos;
	if photos.len() > max_photos {
		return Err(ServiceError::invalid(format!("at most {max_photos} photos per review")));
	}

	let mut model = review.into_active_model();
	if let Some(rating) = edit.rating {
		model.rating = Set(rating);
	}
	if let Some(ref comment) = edit.comment {
		model.comment = Set(comment.clone());
	}
	model.photos = Set(model::join_files(&photos));
	let updated = model.update(ctx.db()).await?;

	Ok((updated, dropped))
}
