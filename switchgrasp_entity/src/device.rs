use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A polled switch or router.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_device: i32,
    pub idx_zone: i32,
    /// Last generation in which this device was fully reconciled.
    pub idx_event: i32,
    #[sea_orm(unique)]
    pub hostname: String,
    pub sys_name: Option<String>,
    pub sys_description: Option<String>,
    pub sys_objectid: Option<String>,
    pub sys_uptime: i64,
    pub last_polled: i64,
    pub enabled: bool,
    pub ts_created: DateTime,
    pub ts_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::zone::Entity",
        from = "Column::IdxZone",
        to = "super::zone::Column::IdxZone"
    )]
    Zone,
    #[sea_orm(has_many = "super::l1interface::Entity")]
    L1Interface,
}

impl Related<super::l1interface::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::L1Interface.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
