use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_reviews_and_follows::Reviews;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_index(
				Index::create()
					.unique()
					.name("index-reviews-product-user")
					.table(Reviews::Table)
					.col(Reviews::Product)
					.col(Reviews::User)
					.to_owned()
				)
			.await?;
		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_index(Index::drop().name("index-reviews-product-user").table(Reviews::Table).to_owned())
			.await?;
		Ok(())
	}
}
