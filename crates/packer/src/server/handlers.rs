//! Axum request handlers for all packer endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{package_file_name, ErrorResponse, HealthResponse};
use common::upload::{content_disposition, read_file_field};
use common::ServiceError;
use envelope::pack_file;
use tracing::{info, warn};

use super::state::AppState;

/// `POST /encrypt`: pack the uploaded `file` field for the recipient.
///
/// Responds with the package as an `application/octet-stream` attachment
/// named `encrypted_<name>.fernet`.
pub async fn encrypt(State(state): State<AppState>, multipart: Multipart) -> Response {
    match pack_upload(state, multipart).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, status = e.http_status(), "encrypt request rejected");
            e.into_response()
        }
    }
}

async fn pack_upload(state: AppState, multipart: Multipart) -> Result<Response, ServiceError> {
    let upload = read_file_field(multipart).await?;
    let plaintext_len = upload.data.len();

    let recipient = Arc::clone(&state.recipient);
    let plaintext = upload.data;
    let package = tokio::task::spawn_blocking(move || pack_file(&plaintext, &recipient))
        .await
        .map_err(|e| ServiceError::Internal(format!("encryption task failed: {e}")))??;

    info!(
        file_name = %upload.file_name,
        plaintext_len,
        package_len = package.len(),
        "file encrypted"
    );

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (
            header::CONTENT_DISPOSITION,
            content_disposition("attachment", &package_file_name(&upload.file_name)),
        ),
    ];
    Ok((StatusCode::OK, headers, package).into_response())
}

/// `GET /health`: liveness check. The recipient key is loaded before the
/// server starts listening, so a responding server is always ready.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "packer".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        key_bits: state.recipient.modulus_len() * 8,
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
