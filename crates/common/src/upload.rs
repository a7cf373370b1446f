//! Multipart upload extraction and download headers shared by both services.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;

use crate::error::ServiceError;
use crate::protocol::FILE_FIELD;

/// Filename used when the client sends none.
pub const DEFAULT_FILE_NAME: &str = "upload";

/// A file received in the [`FILE_FIELD`] multipart field.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied filename, or [`DEFAULT_FILE_NAME`].
    pub file_name: String,
    /// Raw file contents.
    pub data: Bytes,
}

/// Read the first [`FILE_FIELD`] field from a multipart body, skipping any others.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] for a malformed body or a missing
/// field, and [`ServiceError::PayloadTooLarge`] when the body limit is hit.
pub async fn read_file_field(mut multipart: Multipart) -> Result<Upload, ServiceError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_owned();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { file_name, data });
    }
    Err(ServiceError::BadRequest(format!(
        "missing `{FILE_FIELD}` field"
    )))
}

fn multipart_error(e: MultipartError) -> ServiceError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge("upload exceeds the configured size limit".into())
    } else {
        ServiceError::BadRequest(format!("malformed upload: {}", e.body_text()))
    }
}

/// Build a `Content-Disposition` value such as `attachment; filename="x.bin"`.
///
/// Characters that cannot appear inside a quoted header string are replaced
/// with `_`.
pub fn content_disposition(kind: &'static str, file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("{kind}; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
        response::IntoResponse,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "upload-test-boundary";

    async fn echo(multipart: Multipart) -> axum::response::Response {
        match read_file_field(multipart).await {
            Ok(u) => (StatusCode::OK, format!("{}:{}", u.file_name, u.data.len())).into_response(),
            Err(e) => e.into_response(),
        }
    }

    fn part(name: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut out = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"");
        if let Some(f) = file_name {
            out.push_str(&format!("; filename=\"{f}\""));
        }
        out.push_str("\r\n\r\n");
        let mut out = out.into_bytes();
        out.extend_from_slice(data);
        out.extend_from_slice(b"\r\n");
        out
    }

    async fn send(parts: Vec<Vec<u8>>) -> (StatusCode, String) {
        let mut body: Vec<u8> = parts.concat();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let resp = Router::new().route("/", post(echo)).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn reads_file_field_and_name() {
        let (status, body) = send(vec![part("file", Some("notes.txt"), b"hello")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "notes.txt:5");
    }

    #[tokio::test]
    async fn skips_other_fields() {
        let (status, body) = send(vec![
            part("comment", None, b"ignored"),
            part("file", Some("a.bin"), b"abc"),
        ])
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "a.bin:3");
    }

    #[tokio::test]
    async fn missing_file_name_gets_default() {
        let (_, body) = send(vec![part("file", None, b"")]).await;
        assert_eq!(body, format!("{DEFAULT_FILE_NAME}:0"));
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, body) = send(vec![part("other", Some("x"), b"x")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("bad_request"));
    }

    #[test]
    fn disposition_quotes_file_name() {
        let v = content_disposition("attachment", "encrypted_a b.txt.fernet");
        assert_eq!(v, "attachment; filename=\"encrypted_a b.txt.fernet\"");
    }

    #[test]
    fn disposition_replaces_unsafe_characters() {
        let v = content_disposition("inline", "bad\"name\\\r\n✓.txt");
        assert_eq!(v, "inline; filename=\"bad_name____.txt\"");
    }
}
