//! Payloads returned by the JEB API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Entry of `GET /startups`. Only the id is needed to fetch the detail.
#[derive(Deserialize, Debug, Clone)]
pub struct StartupSummary {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// `GET /startups/{id}`. Upstream leaves most text fields nullable; the id is required.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StartupDetail {
    pub id: i64,
    pub name: Option<String>,
    pub legal_status: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub social_media_url: Option<String>,
    pub project_status: Option<String>,
    pub needs: Option<String>,
    pub sector: Option<String>,
    pub maturity: Option<String>,
    pub founders: Option<Vec<FounderDetail>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FounderDetail {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl StartupDetail {
    /// Upstream creation date, accepting the formats the API has been seen to emit.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_flexible_date)
    }

    /// Founders to write for this pass. `None` leaves the stored roster untouched.
    pub fn founder_roster(&self) -> Option<&[FounderDetail]> {
        self.founders
            .as_deref()
            .filter(|founders| !founders.is_empty())
    }
}

/// Parses RFC 3339 timestamps, naive date-times and plain dates (as UTC midnight).
pub fn parse_flexible_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in DATE_TIME_FORMATS {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            let naive_dt = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    None
}
