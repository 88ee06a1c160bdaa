//! Integration test: web form endpoints

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use car_price::config::AppConfig;
use car_price::pipeline::ModelStore;
use car_price::server::{create_router, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

fn golden() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden_city.csv")
}

fn app_for(path: &Path, watch: bool) -> axum::Router {
    let config = AppConfig {
        data_path: path.to_path_buf(),
        watch_dataset: watch,
        ..AppConfig::default()
    };
    let store = ModelStore::load(&config.data_path, config.model.clone()).unwrap();
    let state = Arc::new(AppState::new(config, Arc::new(store)));
    create_router(state)
}

fn test_app() -> axum::Router {
    app_for(&golden(), false)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const DELHI_FORM: &str = "city=Delhi&fuel_type=Petrol&body_type=Sedan&transmission_type=Manual\
&previous_owners=0&engine_displacement=1200&kilometers_driven=20000&year_of_manufacture=2015";

#[tokio::test]
async fn test_root_serves_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Find the Best Price for Your Car"));
    assert!(html.contains(r#"name="engine_displacement""#));
    // Default city is the first option
    assert!(html.contains("Predicted Car Price: ₹610,000"));
}

#[tokio::test]
async fn test_predict_returns_price_fragment() {
    let response = test_app().oneshot(form_post(DELHI_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.starts_with(r#"<div id="price""#));
    assert!(html.contains("₹500,000"));
}

#[tokio::test]
async fn test_predict_clamps_and_falls_back() {
    let body = "city=Mumbai&fuel_type=Petrol&engine_displacement=99999&year_of_manufacture=abc";
    let response = test_app().oneshot(form_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown city falls back to the first option, Bangalore
    let html = body_text(response).await;
    assert!(html.contains("₹610,000"));
}

#[tokio::test]
async fn test_health_reports_model() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model"]["rows"], 40);
    assert_eq!(json["model"]["n_estimators"], 100);
    assert_eq!(json["model"]["dropped_columns"][0], "Previous_Owners");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let response = test_app()
        .oneshot(Request::builder().uri("/api/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_watch_refits_changed_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cars.csv");
    std::fs::copy(golden(), &path).unwrap();

    let app = app_for(&path, true);
    let html = body_text(app.clone().oneshot(form_post(DELHI_FORM)).await.unwrap()).await;
    assert!(html.contains("₹500,000"));

    let updated = std::fs::read_to_string(golden()).unwrap().replace("500000", "550000");
    std::fs::write(&path, updated).unwrap();
    let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    std::fs::File::options().write(true).open(&path).unwrap().set_modified(later).unwrap();

    let html = body_text(app.oneshot(form_post(DELHI_FORM)).await.unwrap()).await;
    assert!(html.contains("₹550,000"));
}
