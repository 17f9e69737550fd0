use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::models::ConnectionStatus;
use crate::repositories::{StartupRepository, UpsertOutcome};
use crate::upstream::{StartupDetail, UpstreamApi};

/// Counts reported by one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: u64,
    pub updated: u64,
    /// Upstream summaries seen, whatever became of them
    pub total: u64,
    pub failures: u64,
}

impl SyncSummary {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Sync completed: {} created, {} updated",
            self.created, self.updated
        );
        if self.failures > 0 {
            message.push_str(&format!(", {} errors", self.failures));
        }
        message
    }
}

/// Mirrors the JEB startup catalogue into the local store.
pub struct StartupSync<'a> {
    db: &'a DatabaseConnection,
    upstream: &'a dyn UpstreamApi,
    page_limit: u32,
}

impl<'a> StartupSync<'a> {
    pub fn new(db: &'a DatabaseConnection, upstream: &'a dyn UpstreamApi, page_limit: u32) -> Self {
        Self {
            db,
            upstream,
            page_limit,
        }
    }

    /// One pass over the first `page_limit` upstream startups.
    ///
    /// Only a failed listing aborts the run. A startup whose detail cannot be
    /// fetched or whose write fails is counted in `failures` and skipped.
    #[tracing::instrument(skip(self), fields(page_limit = self.page_limit))]
    pub async fn synchronize(&self) -> Result<SyncSummary, AppError> {
        info!("Starting sync with JEB API");

        let summaries = self
            .upstream
            .list_summaries(0, self.page_limit)
            .await
            .inspect_err(|e| error!("Sync aborted, could not list startups: {}", e))?;

        let mut summary = SyncSummary {
            total: summaries.len() as u64,
            ..Default::default()
        };

        for item in &summaries {
            let detail = match self.upstream.get_detail(item.id).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping startup {}: detail fetch failed: {}", item.id, e);
                    summary.failures += 1;
                    continue;
                }
            };

            match self.store(&detail).await {
                Ok(UpsertOutcome::Created) => summary.created += 1,
                Ok(UpsertOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    warn!("Skipping startup {}: write failed: {}", item.id, e);
                    summary.failures += 1;
                }
            }
        }

        info!(
            "Finished syncing startups. Created: {}, Updated: {}, Total: {}, Errors: {}",
            summary.created, summary.updated, summary.total, summary.failures
        );
        Ok(summary)
    }

    /// Upsert and founder replacement commit together or not at all.
    async fn store(&self, detail: &StartupDetail) -> Result<UpsertOutcome, DbErr> {
        let txn = self.db.begin().await?;
        let repo = StartupRepository::new(&txn);

        let (startup, outcome) = repo.upsert(detail).await?;
        if let Some(roster) = detail.founder_roster() {
            repo.replace_founders(&startup, roster).await?;
        } else {
            debug!("No founders reported for startup {}, keeping stored ones", detail.id);
        }

        txn.commit().await?;
        Ok(outcome)
    }

    /// Probes the JEB API with a single-item listing. Never touches the store.
    #[tracing::instrument(skip(self))]
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.upstream.list_summaries(0, 1).await {
            Ok(_) => ConnectionStatus {
                success: true,
                message: "JEB API connection successful".to_string(),
            },
            Err(e) => {
                warn!("JEB API connection test failed: {}", e);
                ConnectionStatus {
                    success: false,
                    message: format!("JEB API connection failed: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyncSummary;

    #[test]
    fn message_mentions_errors_only_when_present() {
        let clean = SyncSummary {
            created: 2,
            updated: 3,
            total: 5,
            failures: 0,
        };
        assert_eq!(clean.message(), "Sync completed: 2 created, 3 updated");

        let partial = SyncSummary { failures: 1, total: 6, ..clean };
        assert_eq!(partial.message(), "Sync completed: 2 created, 3 updated, 1 errors");
    }
}
