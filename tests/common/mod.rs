#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, Once,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use incubator_api::{
    config::Config,
    create_app, database,
    error::AppError,
    upstream::{FounderDetail, StartupDetail, StartupSummary, UpstreamApi},
    AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jeb_api_url: "http://jeb.invalid".to_string(),
        jeb_group_token: "group-token".to_string(),
        jeb_timeout: Duration::from_secs(1),
        sync_page_limit: 1000,
        sync_interval: Duration::from_secs(3600),
        jwt_secret: "test-secret".to_string(),
        jwt_ttl: Duration::from_secs(3600),
        rate_limit_per_minute: 0,
    }
}

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> DatabaseConnection {
    setup();
    database::connect("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// In-process stand-in for the JEB API.
#[derive(Default)]
pub struct FakeUpstream {
    startups: Mutex<BTreeMap<i64, StartupDetail>>,
    failing_details: Mutex<HashSet<i64>>,
    listing_down: AtomicBool,
    pub detail_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, detail: StartupDetail) {
        self.startups.lock().unwrap().insert(detail.id, detail);
    }

    pub fn fail_detail(&self, id: i64) {
        self.failing_details.lock().unwrap().insert(id);
    }

    pub fn set_listing_down(&self, down: bool) {
        self.listing_down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamApi for FakeUpstream {
    async fn list_summaries(&self, skip: u32, limit: u32) -> Result<Vec<StartupSummary>, AppError> {
        if self.listing_down.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamUnavailable(
                "JEB API request failed with status: 503 Service Unavailable".into(),
            ));
        }
        Ok(self
            .startups
            .lock()
            .unwrap()
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|d| StartupSummary {
                id: d.id,
                name: d.name.clone(),
                sector: d.sector.clone(),
            })
            .collect())
    }

    async fn get_detail(&self, id: i64) -> Result<StartupDetail, AppError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.lock().unwrap().contains(&id) {
            return Err(AppError::UpstreamUnavailable(format!("timeout fetching {}", id)));
        }
        self.startups
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::UpstreamUnavailable(format!("404 for startup {}", id)))
    }
}

pub fn startup(id: i64, name: &str, sector: &str) -> StartupDetail {
    StartupDetail {
        id,
        name: Some(name.to_string()),
        legal_status: Some("SAS".to_string()),
        address: Some("1 rue de la Paix, Paris".to_string()),
        email: Some(format!("contact{}@example.com", id)),
        phone: Some("+33100000000".to_string()),
        created_at: Some(format!("2024-01-{:02}", (id % 28) + 1)),
        description: Some(format!("{} builds things", name)),
        sector: Some(sector.to_string()),
        maturity: Some("MVP".to_string()),
        ..Default::default()
    }
}

pub fn founders(pairs: &[(i64, &str)]) -> Option<Vec<FounderDetail>> {
    Some(
        pairs
            .iter()
            .map(|(id, name)| FounderDetail {
                id: *id,
                name: Some(name.to_string()),
            })
            .collect(),
    )
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub upstream: Arc<FakeUpstream>,
}

pub async fn test_app() -> TestApp {
    let db = test_db().await;
    let upstream = FakeUpstream::new();
    let state = AppState::new(test_config(), db.clone(), upstream.clone());
    TestApp {
        router: create_app(state),
        db,
        upstream,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(build(uri, "GET", token, None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(build(uri, "POST", None, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(build(uri, "PUT", Some(token), Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(build(uri, "DELETE", token, None)).await
    }

    /// Registers through the API and returns `(user id, access token)`.
    pub async fn register(&self, kind: &str, body: Value) -> (String, String) {
        let (status, json) = self.post(&format!("/auth/register/{}", kind), body).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", json);
        (
            json["data"]["user"]["id"].as_str().unwrap().to_string(),
            json["data"]["accessToken"].as_str().unwrap().to_string(),
        )
    }
}

fn build(uri: &str, method: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn member_body(email: &str) -> Value {
    serde_json::json!({
        "email": email,
        "password": "password123",
        "firstName": "John",
        "lastName": "Doe",
        "age": 25,
        "gender": "male"
    })
}

pub fn startup_body(email: &str, sector: &str) -> Value {
    serde_json::json!({
        "email": email,
        "password": "password123",
        "firstName": "John",
        "lastName": "Doe",
        "companyName": "TechCorp SAS",
        "legalStatus": "SAS",
        "address": "123 Innovation Street, 75001 Paris, France",
        "phone": "+33123456789",
        "websiteUrl": "https://techcorp.com",
        "description": "We develop innovative AI solutions for healthcare.",
        "sector": sector,
        "maturity": "MVP",
        "foundingDate": "2022-01-15",
        "teamSize": 5
    })
}

pub fn investor_body(email: &str, investor_type: &str) -> Value {
    serde_json::json!({
        "email": email,
        "password": "password123",
        "firstName": "Jane",
        "lastName": "Smith",
        "investorType": investor_type,
        "investmentRange": {"min": 10000, "max": 500000},
        "preferredSectors": ["Technology", "Healthcare"],
        "preferredStages": ["Seed", "Series A"],
        "portfolioSize": 25,
        "investmentExperience": 8
    })
}
