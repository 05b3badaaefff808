use std::collections::{BTreeMap, BTreeSet};

use sea_orm::{sea_query::Expr, ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QuerySelect, TransactionTrait};

use crate::{errors::{ServiceError, ServiceResult}, ext::AnyQuery, model};

#[allow(async_fn_in_trait)]
pub trait Categories {
	async fn create_category(&self, merchant: i64, requester: i64, name: &str, description: Option<String>) -> ServiceResult<model::product_category::Model>;
	async fn update_category(&self, category: i64, requester: i64, name: Option<String>, description: Option<String>) -> ServiceResult<model::product_category::Model>;
	async fn delete_category(&self, category: i64, requester: i64) -> ServiceResult<()>;
	/// assign new display positions to every category of a merchant at once
	async fn reorder_categories(&self, merchant: i64, requester: i64, order: &[(i64, i32)]) -> ServiceResult<()>;
	async fn categories_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::product_category::Model>, DbErr>;
}

/// make sure `requester` owns `merchant`
pub async fn ensure_owner(merchant: i64, requester: i64, tx: &impl ConnectionTrait) -> ServiceResult<()> {
	match model::merchant::Entity::owner_of(merchant, tx).await? {
		None => Err(ServiceError::NotFound("merchant")),
		Some(owner) if owner != requester => Err(ServiceError::Forbidden),
		Some(_) => Ok(()),
	}
}

/// check that `order` names every category exactly once and positions are exactly 0..n
pub fn validate_order(existing: &BTreeSet<i64>, order: &[(i64, i32)]) -> ServiceResult<()> {
	if order.is_empty() {
		return Err(ServiceError::invalid("category order can't be empty"));
	}

	let mut ids = BTreeSet::new();
	let mut positions = BTreeSet::new();
	for (id, position) in order {
		if !existing.contains(id) {
			return Err(ServiceError::invalid(format!("category #{id} does not belong to this merchant")));
		}
		if !ids.insert(*id) {
			return Err(ServiceError::invalid(format!("category #{id} listed more than once")));
		}
		if !positions.insert(*position) {
			return Err(ServiceError::invalid(format!("position {position} assigned more than once")));
		}
	}

	if ids.len() != existing.len() {
		return Err(ServiceError::invalid("every category of the merchant must be ordered"));
	}

	let expected : BTreeSet<i32> = (0..order.len() as i32).collect();
	if positions != expected {
		return Err(ServiceError::invalid(format!("positions must be exactly 0 to {}", order.len() - 1)));
	}

	Ok(())
}

impl Categories for crate::Context {
	async fn create_category(&self, merchant: i64, requester: i64, name: &str, description: Option<String>) -> ServiceResult<model::product_category::Model> {
		let name = name.trim();
		if name.is_empty() {
			return Err(ServiceError::invalid("category name can't be empty"));
		}
		ensure_owner(merchant, requester, self.db()).await?;

		let tx = self.db().begin().await?;
		let last = model::product_category::Entity::find()
			.filter(model::product_category::Column::Merchant.eq(merchant))
			.select_only()
			.column_as(model::product_category::Column::Position.max(), "max")
			.into_tuple::<Option<i32>>()
			.one(&tx)
			.await?
			.flatten();

		let category = model::product_category::ActiveModel {
			id: NotSet,
			merchant: Set(merchant),
			name: Set(name.to_string()),
			description: Set(description),
			position: Set(last.map_or(0, |x| x + 1)),
		}
			.insert(&tx)
			.await?;
		tx.commit().await?;

		Ok(category)
	}

	async fn update_category(&self, category: i64, requester: i64, name: Option<String>, description: Option<String>) -> ServiceResult<model::product_category::Model> {
		let category = model::product_category::Entity::find_by_id(category)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("category"))?;
		ensure_owner(category.merchant, requester, self.db()).await?;

		let mut model = category.into_active_model();
		if let Some(name) = name {
			let name = name.trim();
			if name.is_empty() {
				return Err(ServiceError::invalid("category name can't be empty"));
			}
			model.name = Set(name.to_string());
		}
		if let Some(description) = description {
			model.description = Set(Some(description));
		}
		Ok(model.update(self.db()).await?)
	}

	async fn delete_category(&self, category: i64, requester: i64) -> ServiceResult<()> {
		let category = model::product_category::Entity::find_by_id(category)
			.one(self.db())
			.await?
			.ok_or(ServiceError::NotFound("category"))?;
		ensure_owner(category.merchant, requester, self.db()).await?;

		let tx = self.db().begin().await?;

		if model::product::Entity::find()
			.filter(model::product::Column::Category.eq(category.id))
			.any(&tx)
			.await?
		{
			return Err(ServiceError::conflict("category still has products"));
		}

		let (merchant, position) = (category.merchant, category.position);
		category.delete(&tx).await?;

		model::product_category::Entity::update_many()
			.col_expr(model::product_category::Column::Position, Expr::col(model::product_category::Column::Position).sub(1))
			.filter(model::product_category::Column::Merchant.eq(merchant))
			.filter(model::product_category::Column::Position.gt(position))
			.exec(&tx)
			.await?;

		tx.commit().await?;
		Ok(())
	}

	async fn reorder_categories(&self, merchant: i64, requester: i64, order: &[(i64, i32)]) -> ServiceResult<()> {
		ensure_owner(merchant, requester, self.db()).await?;

		let tx = self.db().begin().await?;
		let existing : BTreeSet<i64> = model::product_category::Entity::find()
			.filter(model::product_category::Column::Merchant.eq(merchant))
			.select_only()
			.column(model::product_category::Column::Id)
			.into_tuple::<i64>()
			.all(&tx)
			.await?
			.into_iter()
			.collect();

		validate_order(&existing, order)?;

		let order : BTreeMap<i64, i32> = order.iter().copied().collect();
		for (id, position) in order {
			model::product_category::Entity::update_many()
				.col_expr(model::product_category::Column::Position, Expr::value(position))
				.filter(model::product_category::Column::Id.eq(id))
				.filter(model::product_category::Column::Merchant.eq(merchant))
				.exec(&tx)
				.await?;
		}

		tx.commit().await?;
		tracing::debug!("reordered categories of merchant #{merchant}");
		Ok(())
	}

	async fn categories_of(&self, merchant: i64, tx: &impl ConnectionTrait) -> Result<Vec<model::product_category::Model>, DbErr> {
		model::product_category::Entity::find_by_merchant(merchant)
			.all(tx)
			.await
	}
}
