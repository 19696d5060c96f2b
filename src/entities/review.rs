use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_owner_id: Uuid,
    pub car_owner_id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop_owner::Entity",
        from = "Column::ShopOwnerId",
        to = "super::shop_owner::Column::Id",
        on_delete = "Cascade"
    )]
    ShopOwner,
    #[sea_orm(
        belongs_to = "super::car_owner::Entity",
        from = "Column::CarOwnerId",
        to = "super::car_owner::Column::Id",
        on_delete = "Cascade"
    )]
    CarOwner,
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id",
        on_delete = "Cascade"
    )]
    Booking,
}

impl Related<super::shop_owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopOwner.def()
    }
}

impl Related<super::car_owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarOwner.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
