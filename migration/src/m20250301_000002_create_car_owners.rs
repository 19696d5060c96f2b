use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarOwner::Table)
                    .if_not_exists()
                    .col(uuid(CarOwner::Id).primary_key())
                    .col(uuid(CarOwner::UserId).not_null().unique_key())
                    .col(string_len_null(CarOwner::Address, 255))
                    .col(string_len_null(CarOwner::City, 100))
                    .col(
                        timestamp_with_time_zone(CarOwner::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_owner_user")
                            .from(CarOwner::Table, CarOwner::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CarOwner::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CarOwner {
    Table,
    Id,
    UserId,
    Address,
    City,
    CreatedAt,
}
