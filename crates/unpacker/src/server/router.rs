//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Request bodies larger than `max_upload_bytes` are rejected with 413.
/// Cross-origin requests are accepted only from `allowed_origins`.
pub fn build(
    state: AppState,
    max_upload_bytes: usize,
    allowed_origins: Vec<HeaderValue>,
) -> Router {
    Router::new()
        .route("/decrypt", post(handlers::decrypt))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::handlers::test_support::{package, state, upload_request};
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use tower::ServiceExt;

    const PACKER_ORIGIN: &str = "http://localhost:8000";

    fn app(max_upload_bytes: usize) -> Router {
        build(
            state(),
            max_upload_bytes,
            vec![HeaderValue::from_static(PACKER_ORIGIN)],
        )
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app(1024).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn decrypt_is_post_only() {
        let req = Request::builder()
            .uri("/decrypt")
            .body(Body::empty())
            .unwrap();
        let resp = app(1024).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn oversized_upload_returns_413() {
        let req = upload_request("/decrypt", "file", "big.fernet", &[0u8; 4096]);
        let resp = app(1024).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn preflight_from_allowed_origin() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/decrypt")
            .header(header::ORIGIN, PACKER_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
            .body(Body::empty())
            .unwrap();
        let resp = app(1024).oneshot(req).await.unwrap();
        let headers = resp.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], PACKER_ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "x-requested-with"
        );
    }

    #[tokio::test]
    async fn unknown_origin_gets_no_cors_headers() {
        let req = upload_request("/decrypt", "file", "a.fernet", &package(b"hi"));
        let (mut parts, body) = req.into_parts();
        parts
            .headers
            .insert(header::ORIGIN, HeaderValue::from_static("http://evil.example"));
        let resp = app(64 * 1024)
            .oneshot(Request::from_parts(parts, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(!resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn large_text_plaintext_is_compressed_on_request() {
        let plaintext = "line of text\n".repeat(1000);
        let req = upload_request("/decrypt", "file", "a.fernet", &package(plaintext.as_bytes()));
        let (mut parts, body) = req.into_parts();
        parts
            .headers
            .insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        let resp = app(64 * 1024)
            .oneshot(Request::from_parts(parts, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[header::CONTENT_ENCODING], "gzip");
    }
}
