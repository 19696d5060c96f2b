use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000002_create_car_owners::CarOwner;
use super::m20250301_000003_create_shop_owners::ShopOwner;
use super::m20250301_000006_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(uuid(Review::ShopOwnerId).not_null())
                    .col(uuid(Review::CarOwnerId).not_null())
                    .col(uuid(Review::BookingId).not_null().unique_key())
                    .col(integer(Review::Rating).not_null())
                    .col(text_null(Review::Comment))
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Review::Rating).between(1, 5))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_shop_owner")
                            .from(Review::Table, Review::ShopOwnerId)
                            .to(ShopOwner::Table, ShopOwner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_car_owner")
                            .from(Review::Table, Review::CarOwnerId)
                            .to(CarOwner::Table, CarOwner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_booking")
                            .from(Review::Table, Review::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    ShopOwnerId,
    CarOwnerId,
    BookingId,
    Rating,
    Comment,
    CreatedAt,
}
