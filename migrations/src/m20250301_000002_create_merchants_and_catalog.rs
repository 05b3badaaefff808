use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_and_sessions::Users;

#[derive(DeriveIden)]
pub enum MerchantCategories {
	Table,
	Id,
	Name,
}

#[derive(DeriveIden)]
pub enum Merchants {
	Table,
	Id,
	Owner,
	Category,
	Name,
	Address,
	Phone,
	Description,
	Location,
	Image,
	Registered,
}

#[derive(DeriveIden)]
pub enum ProductCategories {
	Table,
	Id,
	Merchant,
	Name,
	Description,
	Position,
}

#[derive(DeriveIden)]
pub enum Products {
	Table,
	Id,
	Merchant,
	Category,
	Name,
	Description,
	Price,
	Image,
	Created,
}

#[derive(DeriveIden)]
pub enum Promos {
	Table,
	Id,
	Merchant,
	Name,
	Description,
	Terms,
	Instructions,
	Starts,
	Ends,
	Created,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(MerchantCategories::Table)
					.comment("global merchant categories, e.g. food or crafts")
					.col(
						ColumnDef::new(MerchantCategories::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(MerchantCategories::Name).string().not_null().unique_key())
					.to_owned()
			)
			.await?;

		// merchant children are removed by the application in dependency order, so no
		// foreign key below cascades on delete
		manager
			.create_table(
				Table::create()
					.table(Merchants::Table)
					.comment("small businesses, each owned by exactly one user")
					.col(
						ColumnDef::new(Merchants::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Merchants::Owner).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-merchants-owner")
							.from(Merchants::Table, Merchants::Owner)
							.to(Users::Table, Users::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Merchants::Category).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-merchants-category")
							.from(Merchants::Table, Merchants::Category)
							.to(MerchantCategories::Table, MerchantCategories::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Merchants::Name).string().not_null())
					.col(ColumnDef::new(Merchants::Address).string().null())
					.col(ColumnDef::new(Merchants::Phone).string().null())
					.col(ColumnDef::new(Merchants::Description).text().null())
					.col(ColumnDef::new(Merchants::Location).string().null())
					.col(ColumnDef::new(Merchants::Image).string().null())
					.col(ColumnDef::new(Merchants::Registered).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(Index::create().name("index-merchants-owner").table(Merchants::Table).col(Merchants::Owner).to_owned())
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-merchants-registered")
					.table(Merchants::Table)
					.col((Merchants::Registered, IndexOrder::Desc))
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(ProductCategories::Table)
					.comment("per-merchant product categories with a manual display order")
					.col(
						ColumnDef::new(ProductCategories::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(ProductCategories::Merchant).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-product-categories-merchant")
							.from(ProductCategories::Table, ProductCategories::Merchant)
							.to(Merchants::Table, Merchants::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(ProductCategories::Name).string().not_null())
					.col(ColumnDef::new(ProductCategories::Description).text().null())
					.col(ColumnDef::new(ProductCategories::Position).integer().not_null().default(0))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-product-categories-merchant-position")
					.table(ProductCategories::Table)
					.col(ProductCategories::Merchant)
					.col(ProductCategories::Position)
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Products::Table)
					.comment("products sold by merchants")
					.col(
						ColumnDef::new(Products::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Products::Merchant).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-products-merchant")
							.from(Products::Table, Products::Merchant)
							.to(Merchants::Table, Merchants::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Products::Category).big_integer().null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-products-category")
							.from(Products::Table, Products::Category)
							.to(ProductCategories::Table, ProductCategories::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Products::Name).string().not_null())
					.col(ColumnDef::new(Products::Description).text().null())
					.col(ColumnDef::new(Products::Price).big_integer().not_null().default(0))
					.col(ColumnDef::new(Products::Image).string().null())
					.col(ColumnDef::new(Products::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(Index::create().name("index-products-merchant").table(Products::Table).col(Products::Merchant).to_owned())
			.await?;

		manager
			.create_index(Index::create().name("index-products-category").table(Products::Table).col(Products::Category).to_owned())
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Promos::Table)
					.comment("time bounded promotional offers published by merchants")
					.col(
						ColumnDef::new(Promos::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Promos::Merchant).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-promos-merchant")
							.from(Promos::Table, Promos::Merchant)
							.to(Merchants::Table, Merchants::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Promos::Name).string().not_null())
					.col(ColumnDef::new(Promos::Description).text().null())
					.col(ColumnDef::new(Promos::Terms).text().null())
					.col(ColumnDef::new(Promos::Instructions).text().null())
					.col(ColumnDef::new(Promos::Starts).date().null())
					.col(ColumnDef::new(Promos::Ends).date().null())
					.col(ColumnDef::new(Promos::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(Index::create().name("index-promos-merchant").table(Promos::Table).col(Promos::Merchant).to_owned())
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(Promos::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Products::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(ProductCategories::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Merchants::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(MerchantCategories::Table).to_owned())
			.await?;

		Ok(())
	}
}
