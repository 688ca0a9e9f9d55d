use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Oui::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Oui::IdxOui)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Oui::Oui).string().not_null())
                    .col(ColumnDef::new(Oui::Organization).string().not_null())
                    .col(ColumnDef::new(Oui::Enabled).boolean().not_null())
                    .col(
                        ColumnDef::new(Oui::TsCreated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Oui::TsModified)
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
                    .name("idx-oui-oui")
                    .unique()
                    .table(Oui::Table)
                    .col(Oui::Oui)
                    .to_owned(),
            )
            .await?;

        // Row 1 is the fallback for prefixes missing from the registry.
        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Oui::Table)
                    .columns([Oui::IdxOui, Oui::Oui, Oui::Organization, Oui::Enabled])
                    .values_panic([1i32.into(), "".into(), "unknown".into(), true.into()])
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Oui::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Oui {
    Table,
    IdxOui,
    Oui,
    Organization,
    Enabled,
    TsCreated,
    TsModified,
}
