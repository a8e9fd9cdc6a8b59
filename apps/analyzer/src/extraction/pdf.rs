use tracing::debug;

use super::ExtractError;

/// Extracts page text in page order, one line break after each non-empty page.
///
/// pdf-extract lays text out with line breaks around each positioned text run,
/// so leading and trailing line breaks are stripped per page before the page
/// separator is appended. Pages that yield no text contribute nothing.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut text = String::new();
    let mut skipped = 0usize;

    for page_text in &pages {
        let page_text = page_text.trim_matches(['\r', '\n']);
        if page_text.is_empty() {
            skipped += 1;
            continue;
        }
        text.push_str(page_text);
        text.push('\n');
    }

    debug!(
        "Extracted {} chars from {} PDF pages ({} empty)",
        text.len(),
        pages.len(),
        skipped
    );
    Ok(text)
}
