use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250301_000002_create_car_owners::CarOwner;
use super::m20250301_000003_create_shop_owners::ShopOwner;
use super::m20250301_000004_create_vehicles::Vehicle;
use super::m20250301_000005_create_services::Service;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::InProgress,
                        BookingStatus::Completed,
                        BookingStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::CarOwnerId).not_null())
                    .col(uuid(Booking::ShopOwnerId).not_null())
                    .col(uuid(Booking::ServiceId).not_null())
                    .col(uuid(Booking::VehicleId).not_null())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(Booking::ScheduledAt).not_null())
                    .col(double(Booking::TotalAmount).not_null())
                    .col(text_null(Booking::Notes))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_car_owner")
                            .from(Booking::Table, Booking::CarOwnerId)
                            .to(CarOwner::Table, CarOwner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_shop_owner")
                            .from(Booking::Table, Booking::ShopOwnerId)
                            .to(ShopOwner::Table, ShopOwner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Services and vehicles with booking history cannot be deleted on their
                    // own. NO ACTION is checked at the end of the statement, so deleting a
                    // whole account still cascades through both paths.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_vehicle")
                            .from(Booking::Table, Booking::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_shop_owner_status")
                    .table(Booking::Table)
                    .col(Booking::ShopOwnerId)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    CarOwnerId,
    ShopOwnerId,
    ServiceId,
    VehicleId,
    Status,
    ScheduledAt,
    TotalAmount,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "CONFIRMED")]
    Confirmed,
    #[sea_orm(iden = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(iden = "COMPLETED")]
    Completed,
    #[sea_orm(iden = "CANCELLED")]
    Cancelled,
}
