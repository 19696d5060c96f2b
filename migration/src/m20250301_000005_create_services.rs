use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000003_create_shop_owners::ShopOwner;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::ShopOwnerId).not_null())
                    .col(string_len(Service::Name, 100).not_null())
                    .col(text_null(Service::Description))
                    .col(double(Service::Price).not_null())
                    .col(integer(Service::DurationMinutes).not_null())
                    .col(boolean(Service::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Service::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_shop_owner")
                            .from(Service::Table, Service::ShopOwnerId)
                            .to(ShopOwner::Table, ShopOwner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Service::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Service {
    Table,
    Id,
    ShopOwnerId,
    Name,
    Description,
    Price,
    DurationMinutes,
    IsActive,
    CreatedAt,
}
