//! Client for the JEB upstream API, the source of truth for startup records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::AppError;

pub mod types;

pub use types::{FounderDetail, StartupDetail, StartupSummary};

const GROUP_AUTH_HEADER: &str = "X-Group-Authorization";

/// Read access to the upstream startup catalogue.
///
/// Every failure (transport, timeout, non-2xx, undecodable body) is reported as
/// [`AppError::UpstreamUnavailable`]. Calls are attempted once.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn list_summaries(&self, skip: u32, limit: u32) -> Result<Vec<StartupSummary>, AppError>;

    async fn get_detail(&self, id: i64) -> Result<StartupDetail, AppError>;
}

/// HTTP implementation against `{base}/startups`.
#[derive(Clone)]
pub struct JebClient {
    client: Client,
    base_url: String,
    group_token: String,
}

impl JebClient {
    pub fn new(base_url: &str, group_token: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            group_token: group_token.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        debug!("Calling JEB API: {}", url);

        let response = self
            .client
            .get(url)
            .header(GROUP_AUTH_HEADER, &self.group_token)
            .header(header::CONTENT_TYPE, "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!("JEB API error: Status {}, URL: {}, Body: {}", status, url, error_text);
            return Err(AppError::UpstreamUnavailable(format!(
                "JEB API request failed with status: {}",
                status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse JEB API response from {}: {}", url, e);
            AppError::UpstreamUnavailable(format!("Invalid JEB API response: {}", e))
        })
    }
}

#[async_trait]
impl UpstreamApi for JebClient {
    #[tracing::instrument(skip(self))]
    async fn list_summaries(&self, skip: u32, limit: u32) -> Result<Vec<StartupSummary>, AppError> {
        let url = format!("{}/startups", self.base_url);
        let summaries: Vec<StartupSummary> = self
            .get_json(&url, &[("skip", skip.to_string()), ("limit", limit.to_string())])
            .await?;

        info!("Fetched {} startups from JEB API", summaries.len());
        Ok(summaries)
    }

    #[tracing::instrument(skip(self))]
    async fn get_detail(&self, id: i64) -> Result<StartupDetail, AppError> {
        let url = format!("{}/startups/{}", self.base_url, id);
        self.get_json(&url, &[]).await
    }
}
