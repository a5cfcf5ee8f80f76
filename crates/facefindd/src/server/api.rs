use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use tokio::time::timeout;

use facefind_core::{LinearScan, NearestNeighbor};

use super::error::{ApiError, Result};
use super::state::AppState;
use super::types::{FindResponse, HealthResponse};

/// `POST /find` — match an uploaded selfie against the photo index.
///
/// Expects a multipart form with one image file field. When the photo holds
/// several faces, only the detector's most confident one is used as the
/// query; which face the user actually meant is unknowable here.
pub async fn find_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<FindResponse>> {
    if state.store.is_empty() {
        return Err(ApiError::EmptyStore);
    }

    let bytes = file_field_bytes(multipart).await?;

    let image = image::load_from_memory(&bytes)
        .map_err(|_| ApiError::BadImage)?
        .to_rgb8();

    let start = Instant::now();
    let faces = timeout(state.request_timeout, state.engine.analyze(image))
        .await
        .map_err(|_| ApiError::Timeout)??;

    let query = faces.first().ok_or(ApiError::NoFaceDetected)?;
    let matches = LinearScan::new(&state.store).search(&query.embedding, state.search)?;

    tracing::info!(
        faces = faces.len(),
        matches = matches.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "find query served"
    );

    Ok(Json(FindResponse { matches }))
}

/// Pull the `file` field out of the upload form.
///
/// Other fields are skipped rather than rejected, so frontends can attach
/// extra form data without breaking; a form with no `file` field at all is
/// a [`ApiError::MissingFile`].
async fn file_field_bytes(mut multipart: Multipart) -> Result<axum::body::Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
    {
        if field.name() == Some("file") {
            return field.bytes().await.map_err(|e| ApiError::Internal(e.into()));
        }
    }
    Err(ApiError::MissingFile)
}

/// `GET /health` — liveness plus store stats for deployment platforms.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        records: state.store.len(),
        dimension: state.store.dimension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "test-boundary";

    async fn multipart_from(parts: &[(&str, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, value) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let req = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_file_field_found_after_other_fields() {
        // A leading non-file field must not be mistaken for the upload.
        let multipart = multipart_from(&[("note", "hello"), ("file", "fake-image-bytes")]).await;
        let bytes = file_field_bytes(multipart).await.unwrap();
        assert_eq!(&bytes[..], b"fake-image-bytes");
    }

    #[tokio::test]
    async fn test_form_without_file_field_is_rejected() {
        let multipart = multipart_from(&[("note", "hello")]).await;
        let err = file_field_bytes(multipart).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFile));
    }

    #[tokio::test]
    async fn test_empty_form_is_rejected() {
        let multipart = multipart_from(&[]).await;
        let err = file_field_bytes(multipart).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFile));
    }
}
