//! Axum route handler for the Analysis API.

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisError, FALLBACK_ANALYSIS};
use crate::errors::AppError;
use crate::extraction::handlers::{extract_document, read_upload_form};
use crate::extraction::UNDECODABLE_TEXT_MESSAGE;
use crate::state::AppState;

/// Filename offered when the feedback is downloaded as text.
pub const DOWNLOAD_FILENAME: &str = "resume_analysis.txt";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default)]
    pub download: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub analysis: String,
    pub job_role: Option<String>,
    pub filename: Option<String>,
    /// True when `analysis` is the canned guidance rather than model output.
    pub fallback: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// POST /api/v1/analyze
///
/// Multipart form with a `file` part and an optional `job_role` part.
/// Returns JSON, or a plain-text attachment with `?download=true`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_upload_form(multipart).await?;
    let analysis_id = Uuid::new_v4();
    let filename = form.document.filename.clone();

    info!(
        %analysis_id,
        "Analysis requested for {} ({}, {} bytes)",
        filename.as_deref().unwrap_or("<unnamed>"),
        form.document.mime_type,
        form.document.bytes.len()
    );

    let text = extract_document(form.document).await?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "File does not have any content".to_string(),
        ));
    }
    if text == UNDECODABLE_TEXT_MESSAGE {
        return Err(AppError::UnprocessableEntity(text));
    }

    let (analysis, fallback) = match state
        .analyzer
        .analyze(&text, form.job_role.as_deref())
        .await
    {
        Ok(analysis) => (analysis, false),
        Err(AnalysisError::Remote(e)) if state.config.fallback_on_error => {
            warn!(%analysis_id, "Remote analysis failed, serving fallback guidance: {e}");
            (FALLBACK_ANALYSIS.to_string(), true)
        }
        Err(e) => return Err(e.into()),
    };

    info!(%analysis_id, fallback, "Analysis complete ({} chars)", analysis.len());

    if query.download {
        return Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
                ),
            ],
            analysis,
        )
            .into_response());
    }

    Ok(Json(AnalysisResponse {
        analysis_id,
        analysis,
        job_role: form.job_role,
        filename,
        fallback,
        analyzed_at: Utc::now(),
    })
    .into_response())
}
