use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, TransactionTrait};

use crate::{errors::{ServiceError, ServiceResult}, model, traits::{category::ensure_owner, Notifier}};

#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
	pub merchant: i64,
	pub category: Option<i64>,
	pub name: String,
	pub description: Option<String>,
	pub price: i64,
	/// already stored image
	pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductEdit {
	pub category: Option<i64>,
	pub name: Option<String>,
	pub description: Option<String>,
	pub price: Option<i64>,
	/// replaces the current image, which gets discarded
	pub image: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait Products {
	/// create a product and announce it to the merchant followers
	async fn create_product(&self, requester: i64, draft: ProductDraft) -> ServiceResult<model::product::Model>;
	async fn update_product(&self, product: i64, requester: i64, edit: ProductEdit) -> ServiceResult<model::product::Model>;
	async fn delete_product(&self, product: i64, requester: i64) -> ServiceResult<()>;
	async fn product(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Option<(model::product::Model, Option<model::merchant::Model>)>, DbErr>;
	async fn products_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::product::Model>, DbErr>;
}

async fn ensure_category(merchant: i64, category: i64, tx: &impl ConnectionTrait) -> ServiceResult<()> {
	match model::product_category::Entity::find_by_id(category).one(tx).await? {
		None => Err(ServiceError::NotFound("category")),
		Some(c) if c.merchant != merchant => Err(ServiceError::invalid("category belongs to another merchant")),
		Some(_) => Ok(()),
	}
}

fn validate_price(price: i64) -> ServiceResult<()> {
	if price < 0 {
		return Err(ServiceError::invalid("price can't be negative"));
	}
	Ok(())
}

impl Products for crate::Context {
	async fn create_product(&self, requester: i64, draft: ProductDraft) -> ServiceResult<model::product::Model> {
		let image = draft.image.clone();
		match insert_product(self, requester, draft).await {
			Ok((product, merchant)) => {
				tracing::info!("merchant #{} added product #{} '{}'", merchant.id, product.id, product.name);
				self.announce_product(&product, &merchant).await;
				Ok(product)
			},
			Err(e) => {
				if let Some(image) = image {
					self.storage().discard_all(&[image]).await;
				}
				Err(e)
			},
		}
	}

	async fn update_product(&self, product: i64, requester: i64, edit: ProductEdit) -> ServiceResult<model::product::Model> {
		let new_image = edit.image.clone();
		match edit_product(self, product, requester, edit).await {
			Ok((product, replaced)) => {
				self.storage().discard_all(&replaced).await;
				Ok(product)
			},
			Err(e) => {
				if let Some(image) = new_image {
					self.storage().discard_all(&[image]).await;
				}
				Err(e)
			},
		}
	}

	async fn delete_product(&self, product: i64, requester: i64) -> ServiceResult<()> {
		let product = model::product::Entity::find_by_id(product)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("product"))?;
		ensure_owner(product.merchant, requester, self.db()).await?;

		let tx = self.db().begin().await?;
		let reviews = model::review::Entity::find()
			.filter(model::review::Column::Product.eq(product.id))
			.all(&tx)
			.await?;
		model::review::Entity::delete_many()
			.filter(model::review::Column::Product.eq(product.id))
			.exec(&tx)
			.await?;
		let mut files = product.images();
		files.extend(reviews.iter().flat_map(|r| r.photos()));
		product.delete(&tx).await?;
		tx.commit().await?;

		self.storage().discard_all(&files).await;
		Ok(())
	}

	async fn product(&self, product: i64, tx: &impl ConnectionTrait) -> Result<Option<(model::product::Model, Option<model::merchant::Model>)>, DbErr> {
		model::product::Entity::find_by_id(product)
			.find_also_related(model::merchant::Entity)
			.one(tx)
			.await
	}

	async fn products_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::product::Model>, DbErr> {
		model::product::Entity::find()
			.filter(model::product::Column::Merchant.eq(merchant))
			.order_by_desc(model::product::Column::Created)
			.order_by_desc(model::product::Column::Id)
			.all(tx)
			.await
	}
}

async fn insert_product(ctx: &crate::Context, requester: i64, draft: ProductDraft) -> ServiceResult<(model::product::Model, model::merchant::Model)> {
	let name = draft.name.trim();
	if name.is_empty() {
		return Err(ServiceError::invalid("product name can't be empty"));
	}
	validate_price(draft.price)?;

	let merchant = model::merchant::Entity::find_by_id(draft.merchant)
		.one(ctx.db())
		.await?
		.ok_or(ServiceError::NotFound("merchant"))?;
	if merchant.owner != requester {
		return Err(ServiceError::Forbidden);
	}

	if let Some(category) = draft.category {
		ensure_category(merchant.id, category, ctx.db()).await?;
	}

	let product = model::product::ActiveModel {
		id: NotSet,
		merchant: Set(merchant.id),
		category: Set(draft.category),
		name: Set(name.to_string()),
		description: Set(draft.description),
		price: Set(draft.price),
		image: Set(draft.image),
		created: Set(chrono::Utc::now()),
	}
		.insert(ctx.db())
		.await?;

	Ok((product, merchant))
}

/// returns the updated product and the stored images it no longer references
async fn edit_product(ctx: &crate::Context, product: i64, requester: i64, edit: ProductEdit) -> ServiceResult<(model::product::Model, Vec<String>)> {
	let product = model::product::Entity::find_by_id(product)
		.one(ctx.db())
		.await?
		.ok_or(ServiceError::NotFound("product"))?;
	ensure_owner(product.merchant, requester, ctx.db()).await?;

	if let Some(category) = edit.category {
		ensure_category(product.merchant, category, ctx.db()).await?;
	}

	let replaced = if edit.image.is_some() { product.images() } else { Vec::new() };
	let mut model = product.into_active_model();

	if let Some(name) = edit.name {
		let name = name.trim();
		if name.is_empty() {
			return Err(ServiceError::invalid("product name can't be empty"));
		}
		model.name = Set(name.to_string());
	}
	if let Some(price) = edit.price {
		validate_price(price)?;
		model.price = Set(price);
	}
	if let Some(description) = edit.description {
		model.description = Set(Some(description));
	}
	if let Some(category) = edit.category {
		model.category = Set(Some(category));
	}
	if let Some(image) = edit.image {
		model.image = Set(Some(image));
	}

	Ok((model.update(ctx.db()).await?, replaced))
}
