//! Axum handlers and multipart plumbing for document uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::UploadedDocument;

/// Fields of an upload form: the resume file plus an optional job role.
#[derive(Debug)]
pub struct UploadForm {
    pub document: UploadedDocument,
    pub job_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: Option<String>,
    pub mime_type: String,
    pub text: String,
}

/// Reads the `file` and `job_role` fields; unknown fields are ignored.
/// A blank job role is treated as absent.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut document = None;
    let mut job_role = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let mime_type = field.content_type().map(str::to_string).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                document = Some(UploadedDocument {
                    bytes,
                    mime_type,
                    filename,
                });
            }
            Some("job_role") => {
                let role = field.text().await.map_err(multipart_error)?;
                let role = role.trim();
                job_role = (!role.is_empty()).then(|| role.to_string());
            }
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;
    Ok(UploadForm { document, job_role })
}

/// Runs extraction off the async runtime; PDF parsing is CPU-bound.
pub async fn extract_document(document: UploadedDocument) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || document.extract_text())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    Ok(text)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart upload: {}", e.body_text()))
    }
}

/// POST /api/v1/extract
///
/// Returns the extracted text exactly as the analysis step would see it.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let filename = form.document.filename.clone();
    let mime_type = form.document.mime_type.clone();

    let text = extract_document(form.document).await?;
    info!(
        "Extracted {} chars from {} ({})",
        text.len(),
        filename.as_deref().unwrap_or("<unnamed>"),
        mime_type
    );

    Ok(Json(ExtractResponse {
        filename,
        mime_type,
        text,
    }))
}
