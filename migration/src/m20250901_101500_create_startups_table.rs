use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Startups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Startups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Startups::JebId).big_integer().not_null().unique_key()) // reconciliation key for upstream sync
                    .col(ColumnDef::new(Startups::Name).string().not_null())
                    .col(ColumnDef::new(Startups::LegalStatus).string().not_null())
                    .col(ColumnDef::new(Startups::Address).text().not_null())
                    .col(ColumnDef::new(Startups::Email).string().not_null())
                    .col(ColumnDef::new(Startups::Phone).string().not_null())
                    .col(ColumnDef::new(Startups::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Startups::Description).text().not_null())
                    .col(ColumnDef::new(Startups::WebsiteUrl).string().null())
                    .col(ColumnDef::new(Startups::SocialMediaUrl).string().null())
                    .col(ColumnDef::new(Startups::ProjectStatus).string().null())
                    .col(ColumnDef::new(Startups::Needs).text().null())
                    .col(ColumnDef::new(Startups::Sector).string().not_null())
                    .col(ColumnDef::new(Startups::Maturity).string().not_null())
                    .col(
                        ColumnDef::new(Startups::DbCreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Startups::DbUpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_startups_sector")
                    .table(Startups::Table)
                    .col(Startups::Sector)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Startups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Startups {
    Table,
    Id,
    JebId,
    Name,
    LegalStatus,
    Address,
    Email,
    Phone,
    CreatedAt,
    Description,
    WebsiteUrl,
    SocialMediaUrl,
    ProjectStatus,
    Needs,
    Sector,
    Maturity,
    DbCreatedAt,
    DbUpdatedAt,
}
