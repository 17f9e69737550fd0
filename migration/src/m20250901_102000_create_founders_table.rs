use sea_orm_migration::prelude::*;

use super::m20250901_101500_create_startups_table::Startups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Founders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Founders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Founders::JebId).big_integer().not_null())
                    .col(ColumnDef::new(Founders::Name).string().not_null())
                    .col(ColumnDef::new(Founders::StartupId).string().not_null())
                    .col(ColumnDef::new(Founders::JebStartupId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_founders_startup_id")
                            .from(Founders::Table, Founders::StartupId)
                            .to(Startups::Table, Startups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_founders_jeb_startup_id")
                    .table(Founders::Table)
                    .col(Founders::JebStartupId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Founders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Founders {
    Table,
    Id,
    JebId,
    Name,
    StartupId,
    JebStartupId,
}
