//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the export and template endpoints the web app calls, plus a health
//! check, under one Axum router with permissive CORS and request tracing.

pub mod export;
pub mod template;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/export-as-pdf", post(export::export_as_pdf))
        .route("/api/template", get(template::template_manifest))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
