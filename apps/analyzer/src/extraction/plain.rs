use tracing::warn;

/// Returned in place of text when an upload is neither PDF, DOCX nor valid UTF-8.
pub const UNDECODABLE_TEXT_MESSAGE: &str =
    "Could not decode the file. Please upload a valid text, PDF, or DOCX file.";

/// Strict UTF-8 decode. Never fails: invalid input yields the sentinel message.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!("Upload is not valid UTF-8: {e}");
            UNDECODABLE_TEXT_MESSAGE.to_string()
        }
    }
}
