use sea_orm::{entity::prelude::*, Condition};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "promos")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub merchant: i64,
	pub name: String,
	pub description: Option<String>,
	pub terms: Option<String>,
	pub instructions: Option<String>,
	pub starts: Option<ChronoDate>,
	pub ends: Option<ChronoDate>,
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
}

impl Related<super::merchant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Merchants.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	/// promos whose validity window contains `today`, open ends count as unbounded
	pub fn find_active(today: ChronoDate) -> Select<Entity> {
		Entity::find()
			.filter(Condition::any().add(Column::Starts.is_null()).add(Column::Starts.lte(today)))
			.filter(Condition::any().add(Column::Ends.is_null()).add(Column::Ends.gte(today)))
	}
}

impl Model {
	pub fn is_active(&self, today: ChronoDate) -> bool {
		self.starts.map_or(true, |s| s <= today) && self.ends.map_or(true, |e| e >= today)
	}
}
