use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use affinity_api::models::CatalogItem;
use affinity_api::routes::{create_router, AppState};
use affinity_api::similarity::BatchRunner;
use affinity_api::store::{MemoryCatalog, MemoryRelatednessStore};

fn tagged_item(id: i64, name: &str, tags: &[i64]) -> CatalogItem {
    let mut item = CatalogItem::new(id, name, "");
    item.tags = tags.to_vec();
    item
}

/// Three items with distinct names (no text overlap): 1 and 2 share both
/// tags, 1 and 3 / 2 and 3 share one of three
fn fixture_items() -> Vec<CatalogItem> {
    vec![
        tagged_item(1, "Alpha", &[10, 11]),
        tagged_item(2, "Beta", &[10, 11]),
        tagged_item(3, "Gamma", &[10, 99]),
    ]
}

async fn create_test_server(items: Vec<CatalogItem>) -> TestServer {
    let catalog = Arc::new(MemoryCatalog::new());
    for item in items {
        catalog.add_item(item).await;
    }
    let store = Arc::new(MemoryRelatednessStore::new());
    let runner = Arc::new(BatchRunner::new(catalog, store.clone(), 10, 2));
    let state = Arc::new(AppState {
        runner,
        store,
        top_n: 10,
    });
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Vec::new()).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_rebuild_and_serve_related() {
    let server = create_test_server(fixture_items()).await;

    let response = server.post("/api/v1/admin/related/rebuild").await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["items"], 3);
    assert_eq!(outcome["pairs_scored"], 3);

    let response = server.get("/api/v1/items/1/related").await;
    response.assert_status_ok();
    let related: Vec<Value> = response.json();
    assert_eq!(related.len(), 2);

    // Full tag match first, partial match second
    assert_eq!(related[0]["item_id"], 2);
    assert!((related[0]["score"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(related[1]["item_id"], 3);
    assert!((related[1]["score"].as_f64().unwrap() - 0.4 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_related_respects_limit() {
    let server = create_test_server(fixture_items()).await;
    server.post("/api/v1/admin/related/rebuild").await;

    let response = server
        .get("/api/v1/items/1/related")
        .add_query_param("limit", 1)
        .await;
    response.assert_status_ok();
    let related: Vec<Value> = response.json();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["item_id"], 2);
}

#[tokio::test]
async fn test_related_unknown_item_is_empty() {
    let server = create_test_server(fixture_items()).await;
    server.post("/api/v1/admin/related/rebuild").await;

    let response = server.get("/api/v1/items/999/related").await;
    response.assert_status_ok();
    let related: Vec<Value> = response.json();
    assert!(related.is_empty());
}

#[tokio::test]
async fn test_related_before_any_run_is_empty() {
    let server = create_test_server(fixture_items()).await;

    let response = server.get("/api/v1/items/1/related").await;
    response.assert_status_ok();
    let related: Vec<Value> = response.json();
    assert!(related.is_empty());
}

#[tokio::test]
async fn test_rebuild_on_empty_catalog_completes() {
    let server = create_test_server(Vec::new()).await;

    let response = server.post("/api/v1/admin/related/rebuild").await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["items"], 0);
    assert_eq!(outcome["edges_written"], 0);
}

#[tokio::test]
async fn test_status_reflects_runs() {
    let server = create_test_server(fixture_items()).await;

    let response = server.get("/api/v1/admin/related/status").await;
    response.assert_status_ok();
    let status: Value = response.json();
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["running"], false);
    assert!(status["last_run"].is_null());

    server.post("/api/v1/admin/related/rebuild").await;

    let response = server.get("/api/v1/admin/related/status").await;
    let status: Value = response.json();
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["last_run"]["status"], "completed");
    assert!(status["last_run"]["finished_at"].is_string());
}

#[tokio::test]
async fn test_cancel_is_accepted_when_idle() {
    let server = create_test_server(fixture_items()).await;

    let response = server.post("/api/v1/admin/related/cancel").await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["status"], "cancellation_requested");
}

#[tokio::test]
async fn test_request_id_echoed_in_response() {
    let server = create_test_server(Vec::new()).await;

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}
