use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_and_sessions;
mod m20250301_000002_create_merchants_and_catalog;
mod m20250301_000003_create_reviews_and_follows;
mod m20250301_000004_create_notifications_and_deliveries;
mod m20250412_000001_add_review_unique_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20250301_000001_create_users_and_sessions::Migration),
			Box::new(m20250301_000002_create_merchants_and_catalog::Migration),
			Box::new(m20250301_000003_create_reviews_and_follows::Migration),
			Box::new(m20250301_000004_create_notifications_and_deliveries::Migration),
			Box::new(m20250412_000001_add_review_unique_index::Migration),
		]
	}
}

pub use sea_orm_migration::MigratorTrait;
