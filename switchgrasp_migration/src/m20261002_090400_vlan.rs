use sea_orm_migration::prelude::*;

use super::m20261002_090000_event::Event;
use super::m20261002_090200_device::Device;
use super::m20261002_090300_l1interface::L1Interface;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vlan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vlan::IdxVlan)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vlan::IdxDevice).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vlan-device")
                            .from(Vlan::Table, Vlan::IdxDevice)
                            .to(Device::Table, Device::IdxDevice),
                    )
                    .col(ColumnDef::new(Vlan::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vlan-event")
                            .from(Vlan::Table, Vlan::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(Vlan::Vlan).integer().not_null())
                    .col(ColumnDef::new(Vlan::Name).string())
                    .col(ColumnDef::new(Vlan::State).integer().not_null())
                    .col(ColumnDef::new(Vlan::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Vlan::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Vlan::TsModified)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-vlan-device-vlan")
                    .unique()
                    .table(Vlan::Table)
                    .col(Vlan::IdxDevice)
                    .col(Vlan::Vlan)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VlanPort::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VlanPort::IdxVlanport)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VlanPort::IdxL1interface).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vlanport-l1interface")
                            .from(VlanPort::Table, VlanPort::IdxL1interface)
                            .to(L1Interface::Table, L1Interface::IdxL1interface),
                    )
                    .col(ColumnDef::new(VlanPort::IdxVlan).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vlanport-vlan")
                            .from(VlanPort::Table, VlanPort::IdxVlan)
                            .to(Vlan::Table, Vlan::IdxVlan),
                    )
                    .col(ColumnDef::new(VlanPort::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vlanport-event")
                            .from(VlanPort::Table, VlanPort::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(VlanPort::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(VlanPort::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(VlanPort::TsModified)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-vlanport-l1interface-vlan")
                    .unique()
                    .table(VlanPort::Table)
                    .col(VlanPort::IdxL1interface)
                    .col(VlanPort::IdxVlan)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VlanPort::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vlan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Vlan {
    Table,
    IdxVlan,
    IdxDevice,
    IdxEvent,
    Vlan,
    Name,
    State,
    Enabled,
    TsCreated,
    TsModified,
}

#[derive(Iden)]
enum VlanPort {
    #[iden = "vlanport"]
    Table,
    #[iden = "idx_vlanport"]
    IdxVlanport,
    #[iden = "idx_l1interface"]
    IdxL1interface,
    IdxVlan,
    IdxEvent,
    Enabled,
    TsCreated,
    TsModified,
}
