//! # Print Service Tests
//!
//! Requests go straight into the router with `oneshot`; no socket is bound.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use reelprint::assets::HttpFileLoader;
use reelprint::config::ReelprintConfig;
use reelprint::server::{AppState, router};

fn app() -> Router {
    let loader = Arc::new(HttpFileLoader::new().unwrap());
    router(Arc::new(AppState::new(ReelprintConfig::default(), loader)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const ROLL: &str = r#"{
    "code": "CR_08001-25",
    "roll_details": { "width_inches": 42, "weight_kg": 512 },
    "paper_specifications": { "gsm": 80, "bf": 18, "shade": "Golden" }
}"#;

const SHIPMENT: &str = r#"{
    "dispatch_number": "DN-7",
    "dispatch_date": "2025-03-12",
    "items": [
        { "gsm": 80, "bf": 18, "shade": "White", "size": 42, "reel": "CR_1", "weight": 50 },
        { "gsm": 80, "bf": 18, "shade": "White", "size": 42, "reel": "CR_2", "weight": 70 }
    ]
}"#;

#[tokio::test]
async fn test_parse_scan() {
    let response = app()
        .oneshot(post_json(
            "/api/scan/parse",
            r#"{"input": " cr_08001 ", "year": "25"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], "CR_08001-25");
    assert_eq!(body["is_valid"], true);
}

#[tokio::test]
async fn test_parse_invalid_scan_is_not_an_error() {
    let response = app()
        .oneshot(post_json("/api/scan/parse", r#"{"input": "CR_"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_valid"], false);
}

#[tokio::test]
async fn test_label_download() {
    let response = app().oneshot(post_json("/api/label", ROLL)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"label_08001-25.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_packing_slip_print_is_inline() {
    let response = app()
        .oneshot(post_json("/api/packing-slip?mode=print", SHIPMENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"packing_slip_DN-7_2025-03-12.pdf\""
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let response = app().oneshot(post_json("/api/label", "{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_empty_shipment_renders_blank_slip() {
    let response = app()
        .oneshot(post_json(
            "/api/packing-slip",
            r#"{"dispatch_number": "DN-8", "items": []}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_barcode_preview_png() {
    let response = app()
        .oneshot(post_json("/api/barcode/preview", r#"{"value": "CR_08001-25"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_barcode_preview_rejects_blank() {
    let response = app()
        .oneshot(post_json("/api/barcode/preview", r#"{"value": "  "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
