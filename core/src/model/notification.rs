use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum NotificationKind {
	Promo = 1,
	Product = 2,
	Review = 3,
}

impl NotificationKind {
	/// type tag carried in push payloads, clients switch on this
	pub fn tag(&self) -> &'static str {
		match self {
			NotificationKind::Promo => "promo",
			NotificationKind::Product => "product",
			NotificationKind::Review => "review",
		}
	}

	/// payload key holding the correlation id
	pub fn reference_key(&self) -> &'static str {
		match self {
			NotificationKind::Promo => "promoId",
			NotificationKind::Product => "productId",
			NotificationKind::Review => "reviewId",
		}
	}
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub kind: NotificationKind,
	pub reference: Option<i64>,
	pub title: String,
	pub body: String,
	pub created: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::delivery::Entity")]
	Deliveries,
}

impl Related<super::delivery::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Deliveries.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
