use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical or logical port, keyed by `(idx_device, ifindex)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "l1interface")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_l1interface: i32,
    pub idx_device: i32,
    pub idx_event: i32,
    pub ifindex: i32,
    /// 0 unknown, 1 half, 2 full, 3 half-auto, 4 full-auto.
    pub duplex: i32,
    pub ethernet: bool,
    pub nativevlan: i32,
    pub trunk: bool,
    pub ifspeed: i64,
    pub iftype: i32,
    pub ifalias: Option<String>,
    pub ifname: Option<String>,
    pub ifdescription: Option<String>,
    pub ifadminstatus: i32,
    pub ifoperstatus: i32,
    /// Epoch seconds since the port was first seen idle, 0 while active.
    pub ts_idle: i64,
    pub cdpcachedeviceid: Option<String>,
    pub cdpcachedeviceport: Option<String>,
    pub cdpcacheplatform: Option<String>,
    pub lldpremportdesc: Option<String>,
    pub lldpremsysdesc: Option<String>,
    pub lldpremsysname: Option<String>,
    pub lldpremchassisid: Option<String>,
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

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
