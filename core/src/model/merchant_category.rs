use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "merchant_categories")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	#[sea_orm(unique)]
	pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::merchant::Entity")]
	Merchants,
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
