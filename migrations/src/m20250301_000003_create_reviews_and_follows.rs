use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_and_sessions::Users;
use super::m20250301_000002_create_merchants_and_catalog::{Merchants, Products};

#[derive(DeriveIden)]
pub enum Reviews {
	Table,
	Id,
	Product,
	User,
	Rating,
	Comment,
	Photos,
	Published,
}

#[derive(DeriveIden)]
pub enum Follows {
	Table,
	Id,
	User,
	Merchant,
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
					.table(Reviews::Table)
					.comment("user reviews of products, with a rating and optional photos")
					.col(
						ColumnDef::new(Reviews::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Reviews::Product).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-reviews-product")
							.from(Reviews::Table, Reviews::Product)
							.to(Products::Table, Products::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Reviews::User).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-reviews-user")
							.from(Reviews::Table, Reviews::User)
							.to(Users::Table, Users::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(Reviews::Rating).integer().not_null())
					.col(ColumnDef::new(Reviews::Comment).text().not_null().default(""))
					.col(ColumnDef::new(Reviews::Photos).string().null())
					.col(ColumnDef::new(Reviews::Published).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-reviews-product-published")
					.table(Reviews::Table)
					.col(Reviews::Product)
					.col((Reviews::Published, IndexOrder::Desc))
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Follows::Table)
					.comment("follow edges between users and merchants")
					.col(
						ColumnDef::new(Follows::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Follows::User).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-follows-user")
							.from(Follows::Table, Follows::User)
							.to(Users::Table, Users::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(Follows::Merchant).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-follows-merchant")
							.from(Follows::Table, Follows::Merchant)
							.to(Merchants::Table, Merchants::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::NoAction)
					)
					.col(ColumnDef::new(Follows::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.unique()
					.name("index-follows-user-merchant")
					.table(Follows::Table)
					.col(Follows::User)
					.col(Follows::Merchant)
					.to_owned()
			)
			.await?;

		manager
			.create_index(Index::create().name("index-follows-merchant").table(Follows::Table).col(Follows::Merchant).to_owned())
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(Follows::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Reviews::Table).to_owned())
			.await?;

		Ok(())
	}
}
