use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use incubator_api::{
    error::AppError,
    upstream::{JebClient, UpstreamApi},
};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct SeenRequest {
    group_token: Option<String>,
    query: HashMap<String, String>,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

fn record(seen: &Seen, headers: &HeaderMap, query: HashMap<String, String>) {
    let group_token = headers
        .get("x-group-authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(SeenRequest { group_token, query });
}

async fn list(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&seen, &headers, query);
    Json(json!([{"id": 1, "name": "Acme", "sector": "AI"}, {"id": 2}])).into_response()
}

async fn detail(State(seen): State<Seen>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    record(&seen, &headers, HashMap::new());
    match id {
        1 => Json(json!({
            "id": 1,
            "name": "Acme",
            "email": null,
            "created_at": "2024-04-10",
            "founders": [{"id": 10, "name": "Ada"}]
        }))
        .into_response(),
        2 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        3 => (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            "{not json",
        )
            .into_response(),
        _ => Json(json!({"name": "No id"})).into_response(),
    }
}

/// Serves a stand-in JEB API on an ephemeral local port.
async fn start_jeb_server() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/startups", get(list))
        .route("/startups/{id}", get(detail))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}/", addr), seen)
}

fn client(base_url: &str) -> JebClient {
    JebClient::new(base_url, "group-secret", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn listing_sends_group_token_and_paging() {
    let (base_url, seen) = start_jeb_server().await;

    let summaries = client(&base_url).list_summaries(40, 20).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name.as_deref(), Some("Acme"));
    assert_eq!(summaries[1].sector, None);

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].group_token.as_deref(), Some("group-secret"));
    assert_eq!(requests[0].query.get("skip").map(String::as_str), Some("40"));
    assert_eq!(requests[0].query.get("limit").map(String::as_str), Some("20"));
}

#[tokio::test]
async fn detail_decodes_nullable_fields() {
    let (base_url, seen) = start_jeb_server().await;

    let detail = client(&base_url).get_detail(1).await.unwrap();
    assert_eq!(detail.id, 1);
    assert_eq!(detail.email, None);
    assert!(detail.created_at_utc().is_some());
    assert_eq!(detail.founder_roster().map(|f| f.len()), Some(1));
    assert_eq!(
        seen.lock().unwrap()[0].group_token.as_deref(),
        Some("group-secret")
    );
}

#[tokio::test]
async fn upstream_failures_map_to_unavailable() {
    let (base_url, _) = start_jeb_server().await;
    let client = client(&base_url);

    // 500, malformed body, then a detail without an id
    for id in [2, 3, 4] {
        let err = client.get_detail(id).await.unwrap_err();
        assert!(
            matches!(err, AppError::UpstreamUnavailable(_)),
            "id {}: unexpected error {:?}",
            id,
            err
        );
    }
}

#[tokio::test]
async fn unreachable_host_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .list_summaries(0, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UpstreamUnavailable(_)));
}
