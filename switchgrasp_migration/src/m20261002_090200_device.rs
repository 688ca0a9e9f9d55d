use sea_orm_migration::prelude::*;

use super::m20261002_090000_event::Event;
use super::m20261002_090100_zone::Zone;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Device::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Device::IdxDevice)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Device::IdxZone).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-device-zone")
                            .from(Device::Table, Device::IdxZone)
                            .to(Zone::Table, Zone::IdxZone),
                    )
                    .col(ColumnDef::new(Device::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-device-event")
                            .from(Device::Table, Device::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(Device::Hostname).string().not_null())
                    .col(ColumnDef::new(Device::SysName).string())
                    .col(ColumnDef::new(Device::SysDescription).string())
                    .col(ColumnDef::new(Device::SysObjectid).string())
                    .col(ColumnDef::new(Device::SysUptime).big_integer().not_null())
                    .col(ColumnDef::new(Device::LastPolled).big_integer().not_null())
                    .col(ColumnDef::new(Device::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Device::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Device::TsModified)
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
                    .name("idx-device-hostname")
                    .unique()
                    .table(Device::Table)
                    .col(Device::Hostname)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Device::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Device {
    Table,
    IdxDevice,
    IdxZone,
    IdxEvent,
    Hostname,
    SysName,
    SysDescription,
    SysObjectid,
    SysUptime,
    LastPolled,
    Enabled,
    TsCreated,
    TsModified,
}
