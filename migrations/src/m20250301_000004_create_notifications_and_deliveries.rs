use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_and_sessions::Users;

#[derive(DeriveIden)]
pub enum Notifications {
	Table,
	Id,
	Kind,
	Reference,
	Title,
	Body,
	Created,
}

#[derive(DeriveIden)]
pub enum NotificationDeliveries {
	Table,
	Id,
	Notification,
	User,
	Delivered,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(Notifications::Table)
					.comment("one row per notified event, shared by all its recipients")
					.col(
						ColumnDef::new(Notifications::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Notifications::Kind).integer().not_null())
					.col(ColumnDef::new(Notifications::Reference).big_integer().null())
					.col(ColumnDef::new(Notifications::Title).string().not_null())
					.col(ColumnDef::new(Notifications::Body).text().not_null())
					.col(ColumnDef::new(Notifications::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(NotificationDeliveries::Table)
					.comment("notifications table, connecting notified events to users")
					.col(
						ColumnDef::new(NotificationDeliveries::Id)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(NotificationDeliveries::Notification).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notification-deliveries-notification")
							.from(NotificationDeliveries::Table, NotificationDeliveries::Notification)
							.to(Notifications::Table, Notifications::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(NotificationDeliveries::User).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notification-deliveries-user")
							.from(NotificationDeliveries::Table, NotificationDeliveries::User)
							.to(Users::Table, Users::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(NotificationDeliveries::Delivered).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.unique()
					.name("index-notification-deliveries-notification-user")
					.table(NotificationDeliveries::Table)
					.col(NotificationDeliveries::Notification)
					.col(NotificationDeliveries::User)
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-notification-deliveries-user-delivered")
					.table(NotificationDeliveries::Table)
					.col(NotificationDeliveries::User)
					.col((NotificationDeliveries::Delivered, IndexOrder::Desc))
					.to_owned()
			).await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(NotificationDeliveries::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Notifications::Table).to_owned())
			.await?;

		Ok(())
	}
}
