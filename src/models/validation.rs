//! Field checks shared by the registration and profile bodies.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::AppError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn email(value: &str) -> Result<(), AppError> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(AppError::ValidationFailed("email must be a valid email address".into()))
    }
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(AppError::ValidationFailed(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )))
    }
}

pub fn not_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::ValidationFailed(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

pub fn in_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), AppError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        Err(AppError::ValidationFailed(format!(
            "{} must be between {} and {}",
            field, min, max
        )))
    } else {
        Ok(())
    }
}

/// Accepts absent values; present ones must be absolute http(s) URLs.
pub fn optional_url(field: &str, value: Option<&str>) -> Result<(), AppError> {
    let Some(raw) = value else {
        return Ok(());
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(AppError::ValidationFailed(format!("{} must be a valid URL", field))),
    }
}

pub fn date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::ValidationFailed(format!("{} must be a date formatted as YYYY-MM-DD", field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(email("founder@startup.com").is_ok());
        assert!(email("a.b+tag@sub.example.org").is_ok());
        assert!(email("no-at-sign").is_err());
        assert!(email("x@localhost").is_err());
    }

    #[test]
    fn password_length() {
        assert!(password("123456").is_ok());
        assert!(password("12345").is_err());
    }

    #[test]
    fn urls() {
        assert!(optional_url("websiteUrl", None).is_ok());
        assert!(optional_url("websiteUrl", Some("https://techcorp.com")).is_ok());
        assert!(optional_url("websiteUrl", Some("techcorp")).is_err());
        assert!(optional_url("websiteUrl", Some("ftp://techcorp.com")).is_err());
    }

    #[test]
    fn ranges_and_dates() {
        assert!(in_range("age", 13, 13, 120).is_ok());
        assert!(in_range("age", 12, 13, 120).is_err());
        assert!(date("foundingDate", "2022-01-15").is_ok());
        assert!(date("foundingDate", "15/01/2022").is_err());
    }
}
