use sea_orm::{entity::prelude::*, QuerySelect, SelectColumns};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "merchants")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub owner: i64,
	pub category: i64,
	pub name: String,
	pub address: Option<String>,
	pub phone: Option<String>,
	pub description: Option<String>,
	pub location: Option<String>,
	pub image: Option<String>,
	pub registered: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::user::Entity",
		from = "Column::Owner",
		to = "super::user::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	Owners,
	#[sea_orm(
		belongs_to = "super::merchant_category::Entity",
		from = "Column::Category",
		to = "super::merchant_category::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	MerchantCategories,
	#[sea_orm(has_many = "super::product::Entity")]
	Products,
	#[sea_orm(has_many = "super::product_category::Entity")]
	ProductCategories,
	#[sea_orm(has_many = "super::promo::Entity")]
	Promos,
	#[sea_orm(has_many = "super::follow::Entity")]
	Follows,
}

impl Related<super::user::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Owners.def()
	}
}

impl Related<super::merchant_category::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::MerchantCategories.def()
	}
}

impl Related<super::product::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Products.def()
	}
}

impl Related<super::product_category::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::ProductCategories.def()
	}
}

impl Related<super::promo::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Promos.def()
	}
}

impl Related<super::follow::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Follows.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub async fn owner_of(id: i64, db: &impl ConnectionTrait) -> Result<Option<i64>, DbErr> {
		Entity::find_by_id(id)
			.select_only()
			.select_column(Column::Owner)
			.into_tuple::<i64>()
			.one(db)
			.await
	}
}
