use sea_orm_migration::prelude::*;

use super::m20261002_090000_event::Event;
use super::m20261002_090200_device::Device;
use super::m20261002_090300_l1interface::L1Interface;
use super::m20261002_090500_oui::Oui;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mac::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mac::IdxMac)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mac::IdxOui).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mac-oui")
                            .from(Mac::Table, Mac::IdxOui)
                            .to(Oui::Table, Oui::IdxOui),
                    )
                    .col(ColumnDef::new(Mac::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mac-event")
                            .from(Mac::Table, Mac::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(Mac::Mac).string().not_null())
                    .col(ColumnDef::new(Mac::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Mac::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Mac::TsModified)
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
                    .name("idx-mac-mac")
                    .unique()
                    .table(Mac::Table)
                    .col(Mac::Mac)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MacIp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacIp::IdxMacip)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MacIp::IdxDevice).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macip-device")
                            .from(MacIp::Table, MacIp::IdxDevice)
                            .to(Device::Table, Device::IdxDevice),
                    )
                    .col(ColumnDef::new(MacIp::IdxMac).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macip-mac")
                            .from(MacIp::Table, MacIp::IdxMac)
                            .to(Mac::Table, Mac::IdxMac),
                    )
                    .col(ColumnDef::new(MacIp::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macip-event")
                            .from(MacIp::Table, MacIp::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(MacIp::Address).string().not_null())
                    .col(ColumnDef::new(MacIp::Hostname).string())
                    .col(ColumnDef::new(MacIp::Version).integer().not_null())
                    .col(ColumnDef::new(MacIp::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(MacIp::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MacIp::TsModified)
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
                    .name("idx-macip-device-mac-address")
                    .unique()
                    .table(MacIp::Table)
                    .col(MacIp::IdxDevice)
                    .col(MacIp::IdxMac)
                    .col(MacIp::Address)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-macip-address")
                    .table(MacIp::Table)
                    .col(MacIp::Address)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MacPort::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacPort::IdxMacport)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MacPort::IdxL1interface).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macport-l1interface")
                            .from(MacPort::Table, MacPort::IdxL1interface)
                            .to(L1Interface::Table, L1Interface::IdxL1interface),
                    )
                    .col(ColumnDef::new(MacPort::IdxMac).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macport-mac")
                            .from(MacPort::Table, MacPort::IdxMac)
                            .to(Mac::Table, Mac::IdxMac),
                    )
                    .col(ColumnDef::new(MacPort::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-macport-event")
                            .from(MacPort::Table, MacPort::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(MacPort::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(MacPort::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MacPort::TsModified)
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
                    .name("idx-macport-l1interface-mac")
                    .unique()
                    .table(MacPort::Table)
                    .col(MacPort::IdxL1interface)
                    .col(MacPort::IdxMac)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MacPort::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MacIp::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Mac::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Mac {
    Table,
    IdxMac,
    IdxOui,
    IdxEvent,
    Mac,
    Enabled,
    TsCreated,
    TsModified,
}

#[derive(Iden)]
enum MacIp {
    #[iden = "macip"]
    Table,
    #[iden = "idx_macip"]
    IdxMacip,
    IdxDevice,
    IdxMac,
    IdxEvent,
    Address,
    Hostname,
    Version,
    Enabled,
    TsCreated,
    TsModified,
}

#[derive(Iden)]
enum MacPort {
    #[iden = "macport"]
    Table,
    #[iden = "idx_macport"]
    IdxMacport,
    #[iden = "idx_l1interface"]
    IdxL1interface,
    IdxMac,
    IdxEvent,
    Enabled,
    TsCreated,
    TsModified,
}
