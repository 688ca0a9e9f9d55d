use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per poll cycle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_event: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub epoch_utc: i64,
    pub enabled: bool,
    pub ts_created: DateTime,
    pub ts_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
