//! HTTP routes for the Foodgram API.
//!
//! # Route Structure
//!
//! Trailing slashes are trimmed before routing, so `/api/recipes/` and
//! `/api/recipes` are the same route.
//!
//! ```text
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (database)
//!
//! # Users
//! GET  /api/users                          - Paginated users
//! POST /api/users                          - Register
//! GET  /api/users/me                       - Caller profile (auth)
//! POST /api/users/set_password             - Change password (auth)
//! GET  /api/users/subscriptions            - Followed authors (auth)
//! GET  /api/users/{id}                     - Profile
//! POST /api/users/{id}/subscribe           - Follow (auth)
//! DELETE /api/users/{id}/subscribe         - Unfollow (auth)
//!
//! # Auth
//! POST /api/auth/token/login               - Issue token
//! POST /api/auth/token/logout              - Revoke token (auth)
//!
//! # Reference data
//! GET  /api/tags, /api/tags/{id}
//! GET  /api/ingredients?name=, /api/ingredients/{id}
//!
//! # Recipes
//! GET  /api/recipes                        - Filtered, paginated listing
//! POST /api/recipes                        - Create (auth)
//! GET  /api/recipes/download_shopping_cart - Shopping list as text (auth)
//! GET  /api/recipes/{id}                   - Detail
//! PATCH|PUT /api/recipes/{id}              - Replace contents (author)
//! DELETE /api/recipes/{id}                 - Delete (author)
//! POST|DELETE /api/recipes/{id}/favorite   - Toggle favorite (auth)
//! POST|DELETE /api/recipes/{id}/shopping_cart - Toggle cart entry (auth)
//!
//! # Media
//! GET  /media/...                          - Stored recipe images
//! ```

pub mod auth;
pub mod extract;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    routing::{get, post},
};
use tower::Layer as _;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::services::media::{MAX_IMAGE_BYTES, MEDIA_URL_PREFIX};
use crate::state::AppState;

/// Request bodies may carry a base64 image, which is 4/3 of its size.
const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

/// Create the `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/api/users", get(users::index).post(users::register))
        .route("/api/users/me", get(users::me))
        .route("/api/users/set_password", post(users::set_password))
        .route("/api/users/subscriptions", get(users::subscriptions))
        .route("/api/users/{id}", get(users::show))
        .route(
            "/api/users/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
        // Auth
        .route("/api/auth/token/login", post(auth::login))
        .route("/api/auth/token/logout", post(auth::logout))
        // Reference data
        .route("/api/tags", get(tags::index))
        .route("/api/tags/{id}", get(tags::show))
        .route("/api/ingredients", get(ingredients::index))
        .route("/api/ingredients/{id}", get(ingredients::show))
        // Recipes
        .route("/api/recipes", get(recipes::index).post(recipes::create))
        .route(
            "/api/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}",
            get(recipes::show)
                .patch(recipes::update)
                .put(recipes::update)
                .delete(recipes::destroy),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
}

/// Build the application router with all layers.
pub fn app(state: AppState) -> Router {
    let media_root = state.media().root().to_path_buf();
    let cors = cors_layer(&state.config().cors_origins);

    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api_routes())
        .nest_service(MEDIA_URL_PREFIX, ServeDir::new(media_root))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// The application wrapped so trailing slashes are trimmed before routing.
pub fn service(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app(state))
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn not_found() -> AppError {
    AppError::not_found()
}
