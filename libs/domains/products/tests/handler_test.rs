//! Handler tests for the Products domain
//!
//! These exercise the HTTP surface of the products router against the
//! in-memory repository:
//! - Request deserialization (JSON / query string → Rust structs)
//! - Response serialization and status codes
//! - Error bodies for validation, not-found and malformed input

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

fn app() -> Router {
    app_with_rules(ProductRules::default())
}

fn app_with_rules(rules: ProductRules) -> Router {
    let service = ProductService::new(InMemoryProductRepository::new(), rules);
    handlers::router(service)
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn patch_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Create `count` products named `p1..pN`; every third one is inactive.
async fn seed(app: &Router, count: usize) {
    for i in 1..=count {
        let response = app
            .clone()
            .oneshot(post_json(
                "/",
                json!({ "name": format!("p{i}"), "price": i, "isActive": i % 3 != 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_create_product_returns_201_with_assigned_id() {
    let response = app()
        .oneshot(post_json(
            "/",
            json!({
                "name": "Widget",
                "description": "A widget",
                "price": 9.99,
                "isActive": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body,
        json!({
            "id": 1,
            "name": "Widget",
            "description": "A widget",
            "price": 9.99,
            "isActive": true
        })
    );
}

#[tokio::test]
async fn test_create_product_accepts_price_as_text_and_defaults_active() {
    let response = app()
        .oneshot(post_json("/", json!({ "name": "Gadget", "price": "12.50" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["price"], 12.5);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["description"], Value::Null);
}

#[tokio::test]
async fn test_create_product_validation_lists_every_violation() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/", json!({ "name": "", "price": "abc" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(
        body["details"]["violations"],
        json!(["name must not be empty", "price must be a number"])
    );

    // Nothing was stored
    let list = json_body(app.oneshot(get("/")).await.unwrap().into_body()).await;
    assert_eq!(list["totalItems"], 0);
}

#[tokio::test]
async fn test_create_product_missing_name_reports_all_violations() {
    let response = app()
        .oneshot(post_json("/", json!({ "price": "abc" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(
        body["details"]["violations"],
        json!(["name is required", "price must be a number"])
    );
}

#[tokio::test]
async fn test_create_product_empty_body_reports_required_fields() {
    let response = app().oneshot(post_json("/", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["violations"],
        json!(["name is required", "price is required"])
    );
}

#[tokio::test]
async fn test_create_product_negative_zero_price_stored_as_zero() {
    let response = app()
        .oneshot(post_json("/", json!({ "name": "Freebie", "price": -0.0 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("\"price\":0.0"), "unexpected body: {text}");
}

#[tokio::test]
async fn test_create_product_negative_price() {
    let response = app()
        .oneshot(post_json("/", json!({ "name": "Widget", "price": -1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "price must not be negative");
}

#[tokio::test]
async fn test_create_product_required_description() {
    let rules = ProductRules {
        description: DescriptionRule::Required,
        ..ProductRules::default()
    };

    let response = app_with_rules(rules)
        .oneshot(post_json("/", json!({ "name": "Widget", "price": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["details"]["violations"], json!(["description is required"]));
}

#[tokio::test]
async fn test_create_product_malformed_json_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_get_product_found() {
    let app = app();
    seed(&app, 2).await;

    let response = app.oneshot(get("/2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["name"], "p2");
}

#[tokio::test]
async fn test_get_product_missing_returns_404() {
    let response = app().oneshot(get("/999999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["message"], "Product 999999 not found");
}

#[tokio::test]
async fn test_get_product_non_integer_id_is_400() {
    let response = app().oneshot(get("/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_list_products_default_page() {
    let app = app();
    seed(&app, 12).await;

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["id"], 12);
    assert_eq!(data[9]["id"], 3);
    assert_eq!(body["totalItems"], 12);
    assert_eq!(
        body["pageInfo"],
        json!({ "hasPreviousPage": false, "hasNextPage": true })
    );
}

#[tokio::test]
async fn test_list_products_last_page_boundaries() {
    let app = app();
    seed(&app, 10).await;

    // page * limit == totalItems
    let body = json_body(
        app.clone()
            .oneshot(get("/?page=2&limit=5"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["pageInfo"],
        json!({ "hasPreviousPage": true, "hasNextPage": false })
    );

    // page * limit == totalItems - 1
    let body = json_body(app.oneshot(get("/?page=3&limit=3")).await.unwrap().into_body()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["pageInfo"]["hasNextPage"], true);
}

#[tokio::test]
async fn test_list_products_filters_by_active_flag() {
    let app = app();
    seed(&app, 6).await;

    let body = json_body(
        app.clone()
            .oneshot(get("/?isActive=true"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(body["totalItems"], 4);
    assert!(data.iter().all(|p| p["isActive"] == true));

    let body = json_body(app.oneshot(get("/?isActive=false")).await.unwrap().into_body()).await;
    assert_eq!(body["totalItems"], 2);
}

#[tokio::test]
async fn test_list_products_rejects_bad_paging() {
    let response = app().oneshot(get("/?page=0&limit=500")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["violations"],
        json!(["limit must not exceed 100", "page must be at least 1"])
    );
}

#[tokio::test]
async fn test_list_products_invalid_query_is_400() {
    let response = app().oneshot(get("/?isActive=maybe")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_update_product_changes_only_given_fields() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/",
            json!({ "name": "Widget", "description": "A widget", "price": 9.99 }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(patch_json("/1", json!({ "price": 150 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body,
        json!({
            "id": 1,
            "name": "Widget",
            "description": "A widget",
            "price": 150.0,
            "isActive": true
        })
    );
}

#[tokio::test]
async fn test_update_product_path_id_overrides_body_id() {
    let app = app();
    seed(&app, 2).await;

    let response = app
        .oneshot(patch_json("/1", json!({ "id": 2, "name": "renamed" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "renamed");
}

#[tokio::test]
async fn test_update_product_empty_patch_returns_current_row() {
    let app = app();
    seed(&app, 1).await;

    let response = app.oneshot(patch_json("/1", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["name"], "p1");
}

#[tokio::test]
async fn test_update_product_missing_returns_404() {
    let response = app()
        .oneshot(patch_json("/42", json!({ "isActive": false })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_product_non_positive_id_is_validation_error() {
    let response = app()
        .oneshot(patch_json("/0", json!({ "name": "x" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["violations"],
        json!(["id must be a positive integer"])
    );
}
