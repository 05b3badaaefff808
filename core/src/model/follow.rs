use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "follows")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub user: i64,
	pub merchant: i64,
	pub created: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::user::Entity",
		from = "Column::User",
		to = "super::user::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Users,
	#[sea_orm(
		belongs_to = "super::merchant::Entity",
		from = "Column::Merchant",
		to = "super::merchant::Column::Id",
		on_update = "Cascade",
		on_delete = "NoAction"
	)]
	Merchants,
}

impl Related<super::user::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Users.def()
	}
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_edge(user: i64, merchant: i64) -> Select<Entity> {
		Entity::find()
			.filter(Column::User.eq(user))
			.filter(Column::Merchant.eq(merchant))
	}
}
