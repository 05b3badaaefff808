use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notification_deliveries")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub notification: i64,
	pub user: i64,
	pub delivered: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::notification::Entity",
		from = "Column::Notification",
		to = "super::notification::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Notifications,
	#[sea_orm(
		belongs_to = "super::user::Entity",
		from = "Column::User",
		to = "super::user::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Users,
}

impl Related<super::notification::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Notifications.def()
	}
}

impl Related<super::user::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Users.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
