//! API routes

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use mailsink_storage::DatabasePool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{auth_middleware, AppState};
use crate::handlers::{emails, health, projects, stats};
use crate::openapi::create_openapi_routes;

/// Create the API router
///
/// `admin_token` enables the admin routes; without it only project API keys
/// are accepted.
pub fn create_router(db_pool: DatabasePool, admin_token: Option<String>) -> Router {
    let state = Arc::new(AppState {
        db_pool,
        admin_token,
    });

    // Health check routes (no auth required)
    let health_routes = Router::new()
        .route("/", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .with_state(state.clone());

    // Project routes
    let project_routes = Router::new()
        .route("/", get(projects::list_projects))
        .route("/", post(projects::create_project))
        .route("/:id", get(projects::get_project))
        .route("/:id", delete(projects::delete_project))
        .route("/:id/emails", delete(projects::purge_project_emails));

    // Email routes
    let email_routes = Router::new()
        .route("/", get(emails::list_emails))
        .route("/:id", get(emails::get_email))
        .route("/:id", delete(emails::delete_email));

    // API v1 routes with authentication
    let api_v1 = Router::new()
        .route("/stats", get(stats::get_stats))
        .nest("/projects", project_routes)
        .nest("/emails", email_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .nest("/health", health_routes)
        .nest("/api/v1", api_v1)
        .merge(create_openapi_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
