use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "CAR_OWNER")]
    CarOwner,
    #[sea_orm(string_value = "SHOP_OWNER")]
    ShopOwner,
}

impl UserRole {
    /// Parses the wire form used in signup payloads (`CAR_OWNER` / `SHOP_OWNER`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CAR_OWNER" => Some(UserRole::CarOwner),
            "SHOP_OWNER" => Some(UserRole::ShopOwner),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::car_owner::Entity")]
    CarOwner,
    #[sea_orm(has_one = "super::shop_owner::Entity")]
    ShopOwner,
}

impl Related<super::car_owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarOwner.def()
    }
}

impl Related<super::shop_owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopOwner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
