use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "macip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_macip: i32,
    pub idx_device: i32,
    pub idx_mac: i32,
    pub idx_event: i32,
    /// IPv6 addresses are stored fully expanded.
    pub address: String,
    pub hostname: Option<String>,
    /// 4 or 6.
    pub version: i32,
    pub enabled: bool,
    pub ts_created: DateTime,
    pub ts_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device::Entity",
        from = "Column::IdxDevice",
        to = "super::device::Column::IdxDevice"
    )]
    Device,
    #[sea_orm(
        belongs_to = "super::mac::Entity",
        from = "Column::IdxMac",
        to = "super::mac::Column::IdxMac"
    )]
    Mac,
}

impl ActiveModelBehavior for ActiveModel {}
