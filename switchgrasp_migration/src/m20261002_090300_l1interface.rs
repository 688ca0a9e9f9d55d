use sea_orm_migration::prelude::*;

use super::m20261002_090000_event::Event;
use super::m20261002_090200_device::Device;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(L1Interface::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(L1Interface::IdxL1interface)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(L1Interface::IdxDevice).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-l1interface-device")
                            .from(L1Interface::Table, L1Interface::IdxDevice)
                            .to(Device::Table, Device::IdxDevice),
                    )
                    .col(ColumnDef::new(L1Interface::IdxEvent).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-l1interface-event")
                            .from(L1Interface::Table, L1Interface::IdxEvent)
                            .to(Event::Table, Event::IdxEvent),
                    )
                    .col(ColumnDef::new(L1Interface::Ifindex).integer().not_null())
                    .col(ColumnDef::new(L1Interface::Duplex).integer().not_null())
                    .col(ColumnDef::new(L1Interface::Ethernet).boolean().not_null())
                    .col(ColumnDef::new(L1Interface::Nativevlan).integer().not_null())
                    .col(ColumnDef::new(L1Interface::Trunk).boolean().not_null())
                    .col(ColumnDef::new(L1Interface::Ifspeed).big_integer().not_null())
                    .col(ColumnDef::new(L1Interface::Iftype).integer().not_null())
                    .col(ColumnDef::new(L1Interface::Ifalias).string())
                    .col(ColumnDef::new(L1Interface::Ifname).string())
                    .col(ColumnDef::new(L1Interface::Ifdescription).string())
                    .col(ColumnDef::new(L1Interface::Ifadminstatus).integer().not_null())
                    .col(ColumnDef::new(L1Interface::Ifoperstatus).integer().not_null())
                    .col(ColumnDef::new(L1Interface::TsIdle).big_integer().not_null())
                    .col(ColumnDef::new(L1Interface::Cdpcachedeviceid).string())
                    .col(ColumnDef::new(L1Interface::Cdpcachedeviceport).string())
                    .col(ColumnDef::new(L1Interface::Cdpcacheplatform).string())
                    .col(ColumnDef::new(L1Interface::Lldpremportdesc).string())
                    .col(ColumnDef::new(L1Interface::Lldpremsysdesc).string())
                    .col(ColumnDef::new(L1Interface::Lldpremsysname).string())
                    .col(ColumnDef::new(L1Interface::Lldpremchassisid).string())
                    .col(ColumnDef::new(L1Interface::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(L1Interface::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(L1Interface::TsModified)
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
                    .name("idx-l1interface-device-ifindex")
                    .unique()
                    .table(L1Interface::Table)
                    .col(L1Interface::IdxDevice)
                    .col(L1Interface::Ifindex)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-l1interface-ifalias")
                    .table(L1Interface::Table)
                    .col(L1Interface::Ifalias)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(L1Interface::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum L1Interface {
    #[iden = "l1interface"]
    Table,
    #[iden = "idx_l1interface"]
    IdxL1interface,
    IdxDevice,
    IdxEvent,
    Ifindex,
    Duplex,
    Ethernet,
    Nativevlan,
    Trunk,
    Ifspeed,
    Iftype,
    Ifalias,
    Ifname,
    Ifdescription,
    Ifadminstatus,
    Ifoperstatus,
    TsIdle,
    Cdpcachedeviceid,
    Cdpcachedeviceport,
    Cdpcacheplatform,
    Lldpremportdesc,
    Lldpremsysdesc,
    Lldpremsysname,
    Lldpremchassisid,
    Enabled,
    TsCreated,
    TsModified,
}
