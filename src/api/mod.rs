pub mod assets;
pub mod auth;
pub mod categories;
pub mod error;
pub mod projects;
pub mod session;
pub mod stats;
pub mod timeline;
pub mod uploads;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::ords::OrdsResponse;
use crate::AppState;

use error::{ApiError, GENERIC_UPSTREAM_ERROR};

/// Parse a successful backend body as JSON; anything else is a 500 with
/// the raw body only in the log.
pub(crate) fn parse_json_body(response: &OrdsResponse) -> Result<Value, ApiError> {
    response.json().ok_or_else(|| {
        tracing::error!(body = %response.body, "Malformed backend response");
        ApiError::internal(GENERIC_UPSTREAM_ERROR)
    })
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (login is the only anonymous entry point)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user));

    let api_routes = Router::new()
        // Projects
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id", put(projects::update_project))
        .route("/projects/:id", delete(projects::delete_project))
        // Categories
        .route("/projects/:id/categorias", get(categories::list_categories))
        .route("/projects/:id/categorias", post(categories::create_category))
        .route(
            "/projects/:id/categorias/:categoriaId",
            put(categories::update_category),
        )
        .route(
            "/projects/:id/categorias/:categoriaId",
            delete(categories::delete_category),
        )
        // Visual assets
        .route("/projects/:id/activos", get(assets::list_assets))
        .route("/projects/:id/activos", post(assets::create_asset))
        .route("/projects/:id/activos/batch", post(assets::create_assets_batch))
        .route("/projects/:id/activos/timeline", get(assets::asset_timeline))
        .route("/projects/:id/activos/:activoId", put(assets::update_asset))
        .route(
            "/projects/:id/activos/:activoId",
            delete(assets::delete_asset),
        )
        // Uploads
        .route(
            "/upload",
            post(uploads::upload_file)
                .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_SIZE + 1024 * 1024)),
        )
        .route("/upload/credentials", post(uploads::upload_credentials))
        // Stats
        .route("/stats", get(stats::get_stats));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
