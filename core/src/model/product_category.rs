use sea_orm::{entity::prelude::*, QueryOrder};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "product_categories")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub merchant: i64,
	pub name: String,
	pub description: Option<String>,
	/// zero-based display order, contiguous within a merchant
	pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::merchant::Entity",
		from = "Column::Merchant",
		to = "super::merchant::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	Merchants,
	#[sea_orm(has_many = "super::product::Entity")]
	Products,
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl Related<super::product::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Products.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_merchant(merchant: i64) -> Select<Entity> {
		Entity::find()
			.filter(Column::Merchant.eq(merchant))
			.order_by_asc(Column::Position)
	}
}
