//! Axum request handlers for all unpacker endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{plaintext_file_name, ErrorResponse, HealthResponse};
use common::upload::{content_disposition, read_file_field};
use common::ServiceError;
use envelope::unpack_file;
use tracing::{info, warn};

use super::state::AppState;
use crate::content_type::FALLBACK;

/// `POST /decrypt`: open the uploaded package with the recipient key.
///
/// The plaintext is returned inline with a sniffed `Content-Type`. A wrong
/// key and a tampered package produce the same `decryption_failed` reply.
pub async fn decrypt(State(state): State<AppState>, multipart: Multipart) -> Response {
    match unpack_upload(state, multipart).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, code = e.code(), status = e.http_status(), "decrypt request rejected");
            e.into_response()
        }
    }
}

async fn unpack_upload(state: AppState, multipart: Multipart) -> Result<Response, ServiceError> {
    let upload = read_file_field(multipart).await?;
    let package_len = upload.data.len();

    let recipient = Arc::clone(&state.recipient);
    let package = upload.data;
    let plaintext = tokio::task::spawn_blocking(move || unpack_file(package, &recipient))
        .await
        .map_err(|e| ServiceError::Internal(format!("decryption task failed: {e}")))??;

    let media_type = state.detector.detect(&plaintext);
    let file_name = plaintext_file_name(&upload.file_name);
    info!(
        file_name = %file_name,
        package_len,
        plaintext_len = plaintext.len(),
        media_type = %media_type,
        "file decrypted"
    );

    let content_type = HeaderValue::from_str(&media_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK));
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (
            header::CONTENT_DISPOSITION,
            content_disposition("inline", &file_name),
        ),
    ];
    Ok((StatusCode::OK, headers, plaintext).into_response())
}

/// `GET /health`: liveness check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "unpacker".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        key_bits: state.recipient.modulus_len() * 8,
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
