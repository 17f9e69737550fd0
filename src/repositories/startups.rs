use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    prelude::*, ActiveModelTrait, ActiveValue::Set, ConnectionTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::{total_pages, Page};
use crate::entities::{founder, startup, Founder, Startup};
use crate::models::{SectorCount, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::upstream::{FounderDetail, StartupDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartupWithFounders {
    pub startup: startup::Model,
    pub founders: Vec<founder::Model>,
}

/// Listing parameters, normalized with [`ListParams::new`].
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub sector: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        sector: Option<String>,
        search: Option<String>,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sector: sector
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all")),
            search: search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Rows to skip, or `None` when the page lies past any storable row.
    fn offset(&self) -> Option<u64> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.limit)
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

fn matches_search(model: &startup::Model, needle: &str) -> bool {
    [&model.name, &model.description, &model.sector]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub struct StartupRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> StartupRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_jeb_id(&self, jeb_id: i64) -> Result<Option<startup::Model>, DbErr> {
        Startup::find()
            .filter(startup::Column::JebId.eq(jeb_id))
            .one(self.conn)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<StartupWithFounders>, DbErr> {
        let Some(startup) = Startup::find_by_id(id.to_string()).one(self.conn).await? else {
            return Ok(None);
        };
        let founders = self.founders_of(&startup.id).await?;
        Ok(Some(StartupWithFounders { startup, founders }))
    }

    pub async fn founders_of(&self, startup_id: &str) -> Result<Vec<founder::Model>, DbErr> {
        Founder::find()
            .filter(founder::Column::StartupId.eq(startup_id))
            .order_by_asc(founder::Column::JebId)
            .all(self.conn)
            .await
    }

    /// Inserts the startup or overwrites every descriptive field of the
    /// record sharing its `jeb_id`. The internal id is kept on update.
    pub async fn upsert(
        &self,
        detail: &StartupDetail,
    ) -> Result<(startup::Model, UpsertOutcome), DbErr> {
        let now = Utc::now();
        let existing = self.find_by_jeb_id(detail.id).await?;

        let (mut active, outcome) = match existing {
            Some(model) => (startup::ActiveModel::from(model), UpsertOutcome::Updated),
            None => (
                startup::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    jeb_id: Set(detail.id),
                    db_created_at: Set(now),
                    ..Default::default()
                },
                UpsertOutcome::Created,
            ),
        };

        active.name = Set(detail.name.clone().unwrap_or_default());
        active.legal_status = Set(detail.legal_status.clone().unwrap_or_default());
        active.address = Set(detail.address.clone().unwrap_or_default());
        active.email = Set(detail.email.clone().unwrap_or_default());
        active.phone = Set(detail.phone.clone().unwrap_or_default());
        active.created_at = Set(detail.created_at_utc());
        active.description = Set(detail.description.clone().unwrap_or_default());
        active.website_url = Set(detail.website_url.clone());
        active.social_media_url = Set(detail.social_media_url.clone());
        active.project_status = Set(detail.project_status.clone());
        active.needs = Set(detail.needs.clone());
        active.sector = Set(detail.sector.clone().unwrap_or_default());
        active.maturity = Set(detail.maturity.clone().unwrap_or_default());
        active.db_updated_at = Set(now);

        let model = match outcome {
            UpsertOutcome::Created => active.insert(self.conn).await?,
            UpsertOutcome::Updated => active.update(self.conn).await?,
        };
        debug!(jeb_id = detail.id, ?outcome, "Stored startup");

        Ok((model, outcome))
    }

    pub async fn delete_founders_by_jeb_startup_id(&self, jeb_startup_id: i64) -> Result<u64, DbErr> {
        let result = Founder::delete_many()
            .filter(founder::Column::JebStartupId.eq(jeb_startup_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn insert_founder(
        &self,
        owner: &startup::Model,
        detail: &FounderDetail,
    ) -> Result<founder::Model, DbErr> {
        founder::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            jeb_id: Set(detail.id),
            name: Set(detail.name.clone().unwrap_or_default()),
            startup_id: Set(owner.id.clone()),
            jeb_startup_id: Set(owner.jeb_id),
        }
        .insert(self.conn)
        .await
    }

    /// Makes the stored founder set of `owner` equal to `roster`.
    pub async fn replace_founders(
        &self,
        owner: &startup::Model,
        roster: &[FounderDetail],
    ) -> Result<Vec<founder::Model>, DbErr> {
        let removed = self.delete_founders_by_jeb_startup_id(owner.jeb_id).await?;
        let mut inserted = Vec::with_capacity(roster.len());
        for detail in roster {
            inserted.push(self.insert_founder(owner, detail).await?);
        }
        debug!(
            jeb_id = owner.jeb_id,
            removed,
            inserted = inserted.len(),
            "Replaced founders"
        );
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Startup::find().count(self.conn).await
    }

    /// Startup count per non-empty sector, ordered by sector name.
    pub async fn sectors(&self) -> Result<Vec<SectorCount>, DbErr> {
        let rows: Vec<(String, i64)> = Startup::find()
            .select_only()
            .column(startup::Column::Sector)
            .column_as(Expr::col(startup::Column::Id).count(), "count")
            .filter(startup::Column::Sector.ne(""))
            .group_by(startup::Column::Sector)
            .order_by_asc(startup::Column::Sector)
            .into_tuple()
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| SectorCount {
                name,
                count: count.max(0) as u64,
            })
            .collect())
    }

    /// Newest first. The sector filter runs in the query, the text search on
    /// the loaded rows, and founders are fetched for the returned page only.
    pub async fn find_all(&self, params: &ListParams) -> Result<Page<StartupWithFounders>, DbErr> {
        let mut query = Startup::find()
            .order_by_desc(startup::Column::CreatedAt)
            .order_by_asc(startup::Column::JebId);
        if let Some(sector) = &params.sector {
            query = query.filter(startup::Column::Sector.eq(sector.as_str()));
        }

        let (total, rows) = match &params.search {
            Some(needle) => {
                let matching: Vec<startup::Model> = query
                    .all(self.conn)
                    .await?
                    .into_iter()
                    .filter(|model| matches_search(model, needle))
                    .collect();
                let total = matching.len() as u64;
                let skip = params
                    .offset()
                    .and_then(|offset| usize::try_from(offset).ok())
                    .unwrap_or(usize::MAX);
                let rows = matching
                    .into_iter()
                    .skip(skip)
                    .take(params.limit as usize)
                    .collect();
                (total, rows)
            }
            None => {
                let total = query.clone().count(self.conn).await?;
                let rows = match params.offset() {
                    Some(offset) => query.offset(offset).limit(params.limit).all(self.conn).await?,
                    None => Vec::new(),
                };
                (total, rows)
            }
        };

        let items = self.attach_founders(rows).await?;
        Ok(Page {
            items,
            total,
            page: params.page,
            limit: params.limit,
            total_pages: total_pages(total, params.limit),
        })
    }

    async fn attach_founders(
        &self,
        startups: Vec<startup::Model>,
    ) -> Result<Vec<StartupWithFounders>, DbErr> {
        if startups.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = startups.iter().map(|s| s.id.clone()).collect();
        let mut by_owner: HashMap<String, Vec<founder::Model>> = HashMap::new();
        for founder in Founder::find()
            .filter(founder::Column::StartupId.is_in(ids))
            .order_by_asc(founder::Column::JebId)
            .all(self.conn)
            .await?
        {
            by_owner
                .entry(founder.startup_id.clone())
                .or_default()
                .push(founder);
        }

        Ok(startups
            .into_iter()
            .map(|startup| {
                let founders = by_owner.remove(&startup.id).unwrap_or_default();
                StartupWithFounders { startup, founders }
            })
            .collect())
    }
}

impl<'c, C: ConnectionTrait + TransactionTrait> StartupRepository<'c, C> {
    /// Removes the founders, then the startup, in one transaction.
    /// Returns `false` when no startup has this id.
    pub async fn delete(&self, id: &str) -> Result<bool, DbErr> {
        let txn = self.conn.begin().await?;

        let Some(model) = Startup::find_by_id(id.to_string()).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        Founder::delete_many()
            .filter(founder::Column::StartupId.eq(model.id.as_str()))
            .exec(&txn)
            .await?;
        Startup::delete_by_id(model.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_clamp_and_normalize() {
        let params = ListParams::new(Some(0), Some(500), Some("all".into()), Some("  AI ".into()));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_PAGE_SIZE);
        assert_eq!(params.sector, None);
        assert_eq!(params.search.as_deref(), Some("ai"));

        let defaults = ListParams::new(None, Some(0), Some("Tech".into()), Some(String::new()));
        assert_eq!(defaults.limit, 1);
        assert_eq!(defaults.sector.as_deref(), Some("Tech"));
        assert_eq!(defaults.search, None);
    }

    #[test]
    fn offset_is_one_based() {
        let params = ListParams::new(Some(3), Some(20), None, None);
        assert_eq!(params.offset(), Some(40));
    }

    #[test]
    fn offset_past_storable_rows_is_none() {
        assert_eq!(ListParams::new(Some(u64::MAX), Some(20), None, None).offset(), None);
        assert_eq!(
            ListParams::new(Some(922_337_203_685_477_581), Some(20), None, None).offset(),
            None
        );
    }
}
