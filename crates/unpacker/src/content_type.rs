//! Media-type detection for recovered plaintext.
//!
//! Packages carry no type information, so the unpacker sniffs the leading
//! bytes of the plaintext to pick a `Content-Type` for the response.

/// Octet-stream fallback for anything unrecognised.
pub const FALLBACK: &str = "application/octet-stream";

/// Detects the media type of a byte buffer.
#[cfg_attr(test, mockall::automock)]
pub trait ContentTypeDetector: Send + Sync {
    /// Media type for `data`, e.g. `application/pdf`.
    fn detect(&self, data: &[u8]) -> String;
}

/// Magic-number detector backed by the [`infer`] signature registry, with a
/// UTF-8 text check before falling back to octet-stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicBytesDetector;

impl ContentTypeDetector for MagicBytesDetector {
    fn detect(&self, data: &[u8]) -> String {
        media_type(data).to_owned()
    }
}

fn media_type(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return "application/x-empty";
    }
    if let Some(kind) = infer::get(data) {
        return kind.mime_type();
    }
    match std::str::from_utf8(data) {
        Ok(text) if is_printable(text) => text_type(text),
        _ => FALLBACK,
    }
}

fn is_printable(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c'))
}

fn text_type(text: &str) -> &'static str {
    let trimmed = text.trim_start();
    let head = trimmed.chars().take(16).collect::<String>().to_ascii_lowercase();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        "application/json"
    } else if head.starts_with("<!doctype html") || head.starts_with("<html") {
        "text/html"
    } else if head.starts_with("<?xml") {
        "text/xml"
    } else {
        "text/plain"
    }
}
