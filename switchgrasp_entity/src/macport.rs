use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A MAC address learned on a port.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "macport")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_macport: i32,
    pub idx_l1interface: i32,
    pub idx_mac: i32,
    pub idx_event: i32,
    pub enabled: bool,
    pub ts_created: DateTime,
    pub ts_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::l1interface::Entity",
        from = "Column::IdxL1interface",
        to = "super::l1interface::Column::IdxL1interface"
    )]
    L1Interface,
    #[sea_orm(
        belongs_to = "super::mac::Entity",
        from = "Column::IdxMac",
        to = "super::mac::Column::IdxMac"
    )]
    Mac,
}

impl ActiveModelBehavior for ActiveModel {}
