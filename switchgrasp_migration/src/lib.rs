pub use sea_orm_migration::prelude::*;

mod m20261002_090000_event;
mod m20261002_090100_zone;
mod m20261002_090200_device;
mod m20261002_090300_l1interface;
mod m20261002_090400_vlan;
mod m20261002_090500_oui;
mod m20261002_090600_mac;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261002_090000_event::Migration),
            Box::new(m20261002_090100_zone::Migration),
            Box::new(m20261002_090200_device::Migration),
            Box::new(m20261002_090300_l1interface::Migration),
            Box::new(m20261002_090400_vlan::Migration),
            Box::new(m20261002_090500_oui::Migration),
            Box::new(m20261002_090600_mac::Migration),
        ]
    }
}
