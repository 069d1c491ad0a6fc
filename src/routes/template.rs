//! `GET /api/template?group=`

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::services::template::{self, TemplateError, TemplateManifest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub group: Option<String>,
}

pub async fn template_manifest(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<TemplateManifest>, (StatusCode, Json<Value>)> {
    let group = query.group.unwrap_or_default();
    template::fetch_manifest(&state.config, state.renderer.as_ref(), &group)
        .await
        .map(Json)
        .map_err(template_error_response)
}

pub(crate) fn template_error_response(err: TemplateError) -> (StatusCode, Json<Value>) {
    if matches!(err, TemplateError::MissingGroup) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })));
    }
    error!(error = %err, "template extraction failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to fetch or parse client page", "details": err.to_string() })),
    )
}

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;
