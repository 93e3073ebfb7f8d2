//! Router tests that need no database.
//!
//! Every request here is answered by routing, extraction or validation
//! before a query would run, so the app is built on a pool that never
//! connects.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use foodgram_integration_tests::TestApp;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::offline();

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let app = TestApp::offline();

    let response = app.get("/health/", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::offline();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.header("x-request-id"), Some("trace-me-123"));
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::offline();

    let response = app.get("/health", None).await;
    let id = response.header("x-request-id").unwrap();
    assert_eq!(id.len(), 36);
}

// ============================================================================
// Error shapes
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::offline();

    let response = app.get("/api/nothing-here/", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let app = TestApp::offline();

    let response = app.delete("/api/tags/", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json(), json!({ "detail": "Method not allowed." }));
}

#[tokio::test]
async fn test_non_numeric_recipe_id_is_404() {
    let app = TestApp::offline();

    let response = app.get("/api/recipes/soup/", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["detail"], "Not found.");
}

#[tokio::test]
async fn test_malformed_json_is_400_detail() {
    let app = TestApp::offline();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["detail"].is_string());
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::offline();

    let response = app.get("/api/users/me/", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json(),
        json!({ "detail": "Authentication credentials were not provided." })
    );
}

#[tokio::test]
async fn test_mutations_require_token() {
    let app = TestApp::offline();

    let cases = [
        (Method::POST, "/api/recipes/"),
        (Method::PATCH, "/api/recipes/1/"),
        (Method::DELETE, "/api/recipes/1/"),
        (Method::POST, "/api/recipes/1/favorite/"),
        (Method::DELETE, "/api/recipes/1/shopping_cart/"),
        (Method::GET, "/api/recipes/download_shopping_cart/"),
        (Method::POST, "/api/users/1/subscribe/"),
        (Method::GET, "/api/users/subscriptions/"),
        (Method::POST, "/api/users/set_password/"),
        (Method::POST, "/api/auth/token/logout/"),
    ];
    for (method, uri) in cases {
        let body = json!({});
        let response = app.request(method.clone(), uri, None, Some(&body)).await;
        assert_eq!(
            response.status,
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should require a token"
        );
    }
}

#[tokio::test]
async fn test_token_header_without_key_is_rejected() {
    let app = TestApp::offline();
    let request = Request::builder()
        .uri("/api/recipes/")
        .header(header::AUTHORIZATION, "Token")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json()["detail"],
        "Invalid token header. No credentials provided."
    );
}

#[tokio::test]
async fn test_token_with_spaces_is_rejected() {
    let app = TestApp::offline();
    let request = Request::builder()
        .uri("/api/recipes/")
        .header(header::AUTHORIZATION, "Token abc def")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Query parsing
// ============================================================================

#[tokio::test]
async fn test_anonymous_favorites_filter_is_empty_page() {
    let app = TestApp::offline();

    for uri in [
        "/api/recipes/?is_favorited=1",
        "/api/recipes/?is_in_shopping_cart=true&tags=breakfast",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(
            response.json(),
            json!({ "count": 0, "next": null, "previous": null, "results": [] })
        );
    }
}

#[tokio::test]
async fn test_invalid_page_is_field_error() {
    let app = TestApp::offline();

    let response = app.get("/api/recipes/?page=abc", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["page"].is_array());
}

#[tokio::test]
async fn test_zero_page_is_field_error() {
    let app = TestApp::offline();

    let response = app.get("/api/recipes/?page=0", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["page"].is_array());
}

#[tokio::test]
async fn test_invalid_flag_is_field_error() {
    let app = TestApp::offline();

    let response = app.get("/api/recipes/?is_favorited=maybe", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "is_favorited": ["Must be a valid boolean."] })
    );
}

#[tokio::test]
async fn test_invalid_author_is_field_error() {
    let app = TestApp::offline();

    let response = app.get("/api/recipes/?author=me", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "author": ["A valid integer is required."] })
    );
}
