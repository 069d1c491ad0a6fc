//! `POST /api/export-as-pdf`

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::services::export::{self, ExportError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn export_as_pdf(
    State(state): State<AppState>,
    payload: Result<Json<ExportBody>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(body) = payload.map_err(body_rejection_response)?;
    let id = body.id.unwrap_or_default();
    info!(presentation_id = %id, title = ?body.title, "export requested");

    let path = export::export_pdf(&state.config, state.renderer.as_ref(), &id, body.title.as_deref())
        .await
        .map_err(export_error_response)?;
    Ok(Json(json!({ "success": true, "path": path.display().to_string() })))
}

fn body_rejection_response(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    warn!(error = %rejection.body_text(), "export body rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid request body", "details": rejection.body_text() })),
    )
}

pub(crate) fn export_error_response(err: ExportError) -> (StatusCode, Json<Value>) {
    match err {
        ExportError::MissingId => (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))),
        ExportError::NoDataDirectory => {
            error!("export refused: APP_DATA_DIRECTORY is not set");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
        }
        other => {
            error!(error = %other, "export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to export presentation", "details": other.to_string() })),
            )
        }
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;
