//! HTTP router construction.
//!
//! Assembles the item routes, sync, health, CORS, and the OpenAPI docs into
//! a single `Router`. Authentication is layered on by the deployment: its
//! middleware inserts the [`AuthUser`](crate::auth::AuthUser) extension on
//! the `/items` group and owns the 401 surface.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let items = Router::new()
        .route(
            "/bankcards",
            get(api::bank_cards::list).post(api::bank_cards::create),
        )
        .route(
            "/bankcards/{id}",
            get(api::bank_cards::get_one).put(api::bank_cards::update),
        )
        .route(
            "/credentials",
            get(api::credentials::list).post(api::credentials::create),
        )
        .route(
            "/credentials/{id}",
            get(api::credentials::get_one).put(api::credentials::update),
        )
        .route("/notes", get(api::notes::list).post(api::notes::create))
        .route(
            "/notes/{id}",
            get(api::notes::get_one).put(api::notes::update),
        )
        .route(
            "/files",
            get(api::files::list)
                .post(api::files::create)
                .layer(DefaultBodyLimit::max(64 * 1024 * 1024)),
        )
        .route(
            "/files/{id}",
            get(api::files::get_one)
                .put(api::files::update)
                .layer(DefaultBodyLimit::max(64 * 1024 * 1024)),
        )
        .route("/sync", get(api::sync::pull).post(api::sync::push));

    Router::new()
        .route("/health", get(api::health::health))
        .nest("/items", items)
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
