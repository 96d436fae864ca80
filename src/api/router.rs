use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

/// Screenshots straight off a phone can be large.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    // Public routes: probes, scrapes, gateway callbacks and stored images
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route(
            "/webhooks/payment",
            get(handlers::webhook::probe).post(handlers::webhook::receive),
        )
        .nest_service("/storage", ServeDir::new(state.store.root()));

    // Protected API routes: bearer token when API_TOKEN is set, user headers always
    let protected = Router::new()
        // Usage gate
        .route("/api/usage", get(handlers::usage::get_usage))
        // Extraction and review
        .route("/api/extract", post(handlers::extract::extract))
        .route(
            "/api/drafts",
            get(handlers::drafts::get_draft).delete(handlers::drafts::clear),
        )
        .route("/api/drafts/rows", post(handlers::drafts::add_row))
        .route(
            "/api/drafts/rows/:id",
            patch(handlers::drafts::edit_row).delete(handlers::drafts::remove_row),
        )
        .route("/api/drafts/commit", post(handlers::drafts::commit))
        // Journal
        .route(
            "/api/trades",
            get(handlers::trades::list).post(handlers::trades::create),
        )
        .route(
            "/api/trades/:id",
            put(handlers::trades::update).delete(handlers::trades::delete),
        )
        .route("/api/stats", get(handlers::stats::summary))
        .route("/api/stats/daily", get(handlers::stats::daily))
        // Account
        .route(
            "/api/profile",
            get(handlers::profile::get_profile)
                .put(handlers::profile::update_profile)
                .delete(handlers::profile::delete_profile),
        )
        .route("/api/subscription", get(handlers::profile::get_subscription))
        // Payments
        .route("/api/payments/orders", post(handlers::payments::create_order))
        .route("/api/payments/:order_id", get(handlers::payments::get_order))
        .route("/api/payments/:order_id/await", get(handlers::payments::await_order))
        // Admin
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route("/api/admin/subscriptions", post(handlers::admin::grant_subscription))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(require_auth));

    // Preflight from the browser app is answered here
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
