use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Location::IdxLocation)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Location::Name).string().not_null())
                    .col(ColumnDef::new(Location::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Location::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Location::TsModified)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Zone::IdxZone)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Zone::IdxLocation).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-zone-location")
                            .from(Zone::Table, Zone::IdxLocation)
                            .to(Location::Table, Location::IdxLocation),
                    )
                    .col(ColumnDef::new(Zone::Name).string().not_null())
                    .col(ColumnDef::new(Zone::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Zone::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Zone::TsModified)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Every device needs a zone; polling never creates one.
        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Location::Table)
                    .columns([Location::IdxLocation, Location::Name, Location::Enabled])
                    .values_panic([1i32.into(), "default".into(), true.into()])
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Zone::Table)
                    .columns([Zone::IdxZone, Zone::IdxLocation, Zone::Name, Zone::Enabled])
                    .values_panic([1i32.into(), 1i32.into(), "default".into(), true.into()])
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Zone::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Location {
    Table,
    IdxLocation,
    Name,
    Enabled,
    TsCreated,
    TsModified,
}

#[derive(Iden)]
pub(crate) enum Zone {
    Table,
    IdxZone,
    IdxLocation,
    Name,
    Enabled,
    TsCreated,
    TsModified,
}
