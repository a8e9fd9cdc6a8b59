use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};
use tracing::debug;

use super::ExtractError;

/// Extracts body paragraphs in document order, each followed by a newline.
///
/// Only paragraphs that are direct children of the document body count; table
/// cells, text boxes and headers are not part of the body paragraph list.
/// Empty paragraphs still produce their newline.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut text = String::new();
    let mut paragraphs = 0usize;
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            push_paragraph(&mut text, paragraph);
            text.push('\n');
            paragraphs += 1;
        }
    }

    debug!(
        "Extracted {} chars from {} DOCX paragraphs",
        text.len(),
        paragraphs
    );
    Ok(text)
}

fn push_paragraph(out: &mut String, paragraph: &Paragraph) {
    push_children(out, &paragraph.children);
}

/// Runs directly in the paragraph and runs wrapped in hyperlinks.
fn push_children(out: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(out, &link.children),
            _ => {}
        }
    }
}
