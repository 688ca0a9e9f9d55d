use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vlan")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_vlan: i32,
    pub idx_device: i32,
    pub idx_event: i32,
    pub vlan: i32,
    pub name: Option<String>,
    pub state: i32,
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
}

impl ActiveModelBehavior for ActiveModel {}
