use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "products")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub merchant: i64,
	pub category: Option<i64>,
	pub name: String,
	pub description: Option<String>,
	pub price: i64,
	/// comma separated stored filenames
	pub image: Option<String>,
	pub created: ChronoDateTimeUtc,
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
	#[sea_orm(
		belongs_to = "super::product_category::Entity",
		from = "Column::Category",
		to = "super::product_category::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	ProductCategories,
	#[sea_orm(has_many = "super::review::Entity")]
	Reviews,
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl Related<super::product_category::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::ProductCategories.def()
	}
}

impl Related<super::review::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Reviews.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn images(&self) -> Vec<String> {
		super::split_files(self.image.as_deref())
	}
}
