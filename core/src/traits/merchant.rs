use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};

use crate::{errors::{ServiceError, ServiceResult}, ext::AnyQuery, model};

#[derive(Debug, Clone, Default)]
pub struct MerchantDraft {
	pub category: i64,
	pub name: String,
	pub address: Option<String>,
	pub phone: Option<String>,
	pub description: Option<String>,
	pub location: Option<String>,
	/// already stored image, discarded if the merchant can't be created
	pub image: Option<String>,
}

/// Everything a merchant owns, deleted children first. Reviews reference products,
/// products reference categories: this order never violates a foreign key.
const CASCADE: [Owned; 5] = [Owned::Reviews, Owned::Products, Owned::Promos, Owned::Categories, Owned::Follows];

#[derive(Debug, Clone, Copy)]
enum Owned {
	Reviews,
	Products,
	Promos,
	Categories,
	Follows,
}

impl Owned {
	async fn purge(self, merchant: i64, products: &[i64], tx: &impl ConnectionTrait) -> Result<u64, DbErr> {
		let res = match self {
			Owned::Reviews => model::review::Entity::delete_many()
				.filter(model::review::Column::Product.is_in(products.iter().copied()))
				.exec(tx)
				.await?,
			Owned::Products => model::product::Entity::delete_many()
				.filter(model::product::Column::Merchant.eq(merchant))
				.exec(tx)
				.await?,
			Owned::Promos => model::promo::Entity::delete_many()
				.filter(model::promo::Column::Merchant.eq(merchant))
				.exec(tx)
				.await?,
			Owned::Categories => model::product_category::Entity::delete_many()
				.filter(model::product_category::Column::Merchant.eq(merchant))
				.exec(tx)
				.await?,
			Owned::Follows => model::follow::Entity::delete_many()
				.filter(model::follow::Column::Merchant.eq(merchant))
				.exec(tx)
				.await?,
		};
		Ok(res.rows_affected)
	}
}

#[allow(async_fn_in_trait)]
pub trait Merchants {
	async fn create_merchant(&self, owner: i64, draft: MerchantDraft) -> ServiceResult<model::merchant::Model>;
	/// remove a merchant with everything it owns, in one transaction
	async fn delete_merchant(&self, merchant: i64, requester: i64) -> ServiceResult<()>;
	async fn merchants(&self, category: Option<i64>, offset: u64, limit: u64, tx: &impl ConnectionTrait) -> Result<Vec<(model::merchant::Model, Option<model::merchant_category::Model>)>, DbErr>;
	async fn merchants_of(&self, owner: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::merchant::Model>, DbErr>;
	async fn merchant_categories(&self, tx: &impl ConnectionTrait) -> Result<Vec<model::merchant_category::Model>, DbErr>;
}

impl Merchants for crate::Context {
	async fn create_merchant(&self, owner: i64, draft: MerchantDraft) -> ServiceResult<model::merchant::Model> {
		let image = draft.image.clone();
		match insert_merchant(self, owner, draft).await {
			Ok(merchant) => {
				tracing::info!("user #{owner} registered merchant #{} '{}'", merchant.id, merchant.name);
				Ok(merchant)
			},
			Err(e) => {
				if let Some(image) = image {
					self.storage().discard_all(&[image]).await;
				}
				Err(e)
			},
		}
	}

	async fn delete_merchant(&self, merchant: i64, requester: i64) -> ServiceResult<()> {
		let merchant = model::merchant::Entity::find_by_id(merchant)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("merchant"))?;

		if merchant.owner != requester {
			return Err(ServiceError::Forbidden);
		}

		let tx = self.db().begin().await?;

		let products = model::product::Entity::find()
			.filter(model::product::Column::Merchant.eq(merchant.id))
			.all(&tx)
			.await?;
		let product_ids : Vec<i64> = products.iter().map(|p| p.id).collect();
		let reviews = model::review::Entity::find()
			.filter(model::review::Column::Product.is_in(product_ids.iter().copied()))
			.all(&tx)
			.await?;

		let mut files : Vec<String> = merchant.image.iter().cloned().collect();
		files.extend(products.iter().flat_map(|p| p.images()));
		files.extend(reviews.iter().flat_map(|r| r.photos()));

		for owned in CASCADE {
			let removed = owned.purge(merchant.id, &product_ids, &tx).await?;
			tracing::debug!("removed {removed} {owned:?} of merchant #{}", merchant.id);
		}

		let id = merchant.id;
		merchant.delete(&tx).await?;
		tx.commit().await?;

		tracing::info!("deleted merchant #{id} with {} products and {} reviews", products.len(), reviews.len());
		self.storage().discard_all(&files).await;
		Ok(())
	}

	async fn merchants(&self, category: Option<i64>, offset: u64, limit: u64, tx: &impl ConnectionTrait) -> Result<Vec<(model::merchant::Model, Option<model::merchant_category::Model>)>, DbErr> {
		let mut select = model::merchant::Entity::find();
		if let Some(category) = category {
			select = select.filter(model::merchant::Column::Category.eq(category));
		}
		select
			.order_by_desc(model::merchant::Column::Registered)
			.order_by_desc(model::merchant::Column::Id)
			.offset(offset)
			.limit(limit)
			.find_also_related(model::merchant_category::Entity)
			.all(tx)
			.await
	}

	async fn merchants_of(&self, owner: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::merchant::Model>, DbErr> {
		model::merchant::Entity::find()
			.filter(model::merchant::Column::Owner.eq(owner))
			.order_by_desc(model::merchant::Column::Registered)
			.all(tx)
			.await
	}

	async fn merchant_categories(&self, tx: &impl ConnectionTrait) -> Result<Vec<model::merchant_category::Model>, DbErr> {
		model::merchant_category::Entity::find()
			.order_by_asc(model::merchant_category::Column::Name)
			.all(tx)
			.await
	}
}

async fn insert_merchant(ctx: &crate::Context, owner: i64, draft: MerchantDraft) -> ServiceResult<model::merchant::Model> {
	let name = draft.name.trim();
	if name.is_empty() {
		return Err(ServiceError::invalid("merchant name can't be empty"));
	}

	if !model::merchant_category::Entity::find_by_id(draft.category).any(ctx.db()).await? {
		return Err(ServiceError::NotFound("merchant category"));
	}

	Ok(
		model::merchant::ActiveModel {
			id: NotSet,
			owner: Set(owner),
			category: Set(draft.category),
			name: Set(name.to_string()),
			address: Set(draft.address),
			phone: Set(draft.phone),
			description: Set(draft.description),
			location: Set(draft.location),
			image: Set(draft.image),
			registered: Set(chrono::Utc::now()),
		}
			.insert(ctx.db())
			.await?
	)
}
