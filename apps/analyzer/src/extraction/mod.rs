//! Text extraction for uploaded resumes.
//!
//! Dispatches on the declared MIME type: PDF and DOCX get a real parser,
//! everything else is decoded as UTF-8 text. Malformed PDF/DOCX input is a
//! hard error; undecodable text degrades to [`UNDECODABLE_TEXT_MESSAGE`].

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub mod docx;
pub mod handlers;
pub mod pdf;
pub mod plain;

pub use plain::UNDECODABLE_TEXT_MESSAGE;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),
}

/// Which parser a MIME type is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Exact string match; parameters such as `; charset=...` are not stripped.
    pub fn from_mime(mime_type: &str) -> Self {
        match mime_type {
            PDF_MIME => DocumentKind::Pdf,
            DOCX_MIME => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

/// A single uploaded resume as received at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub mime_type: String,
    /// Informational only.
    pub filename: Option<String>,
}

impl UploadedDocument {
    pub fn extract_text(&self) -> Result<String, ExtractError> {
        debug!(
            filename = self.filename.as_deref().unwrap_or("<unnamed>"),
            size = self.bytes.len(),
            "Extracting uploaded document"
        );
        extract_text(&self.bytes, &self.mime_type)
    }
}

/// Converts raw document bytes into plain text according to `mime_type`.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_mime(mime_type);
    debug!("Extraction path {:?} for MIME type '{}'", kind, mime_type);

    match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
        DocumentKind::PlainText => Ok(plain::decode_plain_text(bytes)),
    }
}
