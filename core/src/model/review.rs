use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub product: i64,
	pub user: i64,
	pub rating: i32,
	pub comment: String,
	/// comma separated stored filenames
	pub photos: Option<String>,
	pub published: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::product::Entity",
		from = "Column::Product",
		to = "super::product::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	Products,
	#[sea_orm(
		belongs_to = "super::user::Entity",
		from = "Column::User",
		to = "super::user::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Users,
}

impl Related<super::product::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Products.def()
	}
}

impl Related<super::user::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Users.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_product_user(product: i64, user: i64) -> Select<Entity> {
		Entity::find()
			.filter(Column::Product.eq(product))
			.filter(Column::User.eq(user))
	}
}

impl Model {
	pub fn photos(&self) -> Vec<String> {
		super::split_files(self.photos.as_deref())
	}
}
