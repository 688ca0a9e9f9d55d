use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vlanport")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_vlanport: i32,
    pub idx_l1interface: i32,
    pub idx_vlan: i32,
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
        belongs_to = "super::vlan::Entity",
        from = "Column::IdxVlan",
        to = "super::vlan::Column::IdxVlan"
    )]
    Vlan,
}

impl ActiveModelBehavior for ActiveModel {}
