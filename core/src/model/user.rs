use sea_orm::{entity::prelude::*, QuerySelect, SelectColumns};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub name: String,
	#[sea_orm(unique)]
	pub email: String,
	pub password: String,
	pub phone: Option<String>,
	pub photo: Option<String>,
	pub push_token: Option<String>,
	pub created: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::session::Entity")]
	Sessions,
	#[sea_orm(has_many = "super::merchant::Entity")]
	Merchants,
	#[sea_orm(has_many = "super::review::Entity")]
	Reviews,
	#[sea_orm(has_many = "super::follow::Entity")]
	Follows,
	#[sea_orm(has_many = "super::delivery::Entity")]
	Deliveries,
}

impl Related<super::session::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Sessions.def()
	}
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl Related<super::review::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Reviews.def()
	}
}

impl Related<super::follow::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Follows.def()
	}
}

impl Related<super::delivery::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Deliveries.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_email(email: &str) -> Select<Entity> {
		Entity::find().filter(Column::Email.eq(email))
	}

	pub async fn push_token_of(id: i64, db: &impl ConnectionTrait) -> Result<Option<String>, DbErr> {
		Ok(
			Entity::find_by_id(id)
				.select_only()
				.select_column(Column::PushToken)
				.into_tuple::<Option<String>>()
				.one(db)
				.await?
				.flatten()
		)
	}
}
