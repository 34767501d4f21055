//! `SeaORM` Entity for the rooms table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub description: Option<String>,
    pub status_id: i32,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room_statuses::Entity",
        from = "Column::StatusId",
        to = "super::room_statuses::Column::Id"
    )]
    RoomStatuses,
    #[sea_orm(has_many = "super::reservations::Entity")]
    Reservations,
}

impl Related<super::room_statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomStatuses.def()
    }
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
