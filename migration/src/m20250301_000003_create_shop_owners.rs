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
                    .table(ShopOwner::Table)
                    .if_not_exists()
                    .col(uuid(ShopOwner::Id).primary_key())
                    .col(uuid(ShopOwner::UserId).not_null().unique_key())
                    .col(string_len(ShopOwner::ShopName, 150).not_null())
                    .col(string_len_null(ShopOwner::Address, 255))
                    .col(string_len_null(ShopOwner::City, 100))
                    .col(text_null(ShopOwner::Description))
                    .col(string_len_null(ShopOwner::Phone, 32))
                    .col(
                        timestamp_with_time_zone(ShopOwner::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_owner_user")
                            .from(ShopOwner::Table, ShopOwner::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shop_owner_city")
                    .table(ShopOwner::Table)
                    .col(ShopOwner::City)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShopOwner::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShopOwner {
    Table,
    Id,
    UserId,
    ShopName,
    Address,
    City,
    Description,
    Phone,
    CreatedAt,
}
