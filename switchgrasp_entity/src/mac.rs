use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mac")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub idx_mac: i32,
    pub idx_oui: i32,
    pub idx_event: i32,
    /// Twelve lowercase hex characters, no separators.
    #[sea_orm(unique)]
    pub mac: String,
    pub enabled: bool,
    pub ts_created: DateTime,
    pub ts_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oui::Entity",
        from = "Column::IdxOui",
        to = "super::oui::Column::IdxOui"
    )]
    Oui,
}

impl ActiveModelBehavior for ActiveModel {}
