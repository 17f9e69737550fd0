use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "startups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // Internal id (UUID), assigned on first insert
    #[sea_orm(unique)]
    pub jeb_id: i64, // Upstream id, the sync reconciliation key
    pub name: String,
    pub legal_status: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub email: String,
    pub phone: String,
    pub created_at: Option<DateTimeUtc>, // Creation date reported by upstream
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub website_url: Option<String>,
    pub social_media_url: Option<String>,
    pub project_status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub needs: Option<String>,
    pub sector: String,
    pub maturity: String,
    pub db_created_at: DateTimeUtc,
    pub db_updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::founder::Entity")]
    Founders,
}

impl Related<super::founder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Founders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
