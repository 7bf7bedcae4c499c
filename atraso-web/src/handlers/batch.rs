//! CSV batch prediction handler

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{AppError, AppResult, AppState};
use atraso_core::batch;

/// Fixed download disposition of the annotated CSV.
const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"predicciones_atraso.csv\"";

/// Response header listing visible columns absent from the upload.
const MISSING_COLUMNS_HEADER: &str = "x-missing-columns";

/// Run the pipeline over an uploaded CSV (multipart field `file`) and return
/// the annotated table as a downloadable CSV. Absent visible columns are
/// non-fatal and reported through the `x-missing-columns` header.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut csv_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart request: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            csv_bytes = Some(bytes);
            break;
        }
    }
    let csv_bytes = csv_bytes
        .ok_or_else(|| AppError::ValidationError("multipart field 'file' is required".to_string()))?;

    let mut table = batch::parse_csv(&csv_bytes)?;
    let summary = batch::annotate(state.pipeline.as_ref(), &mut table)?;
    let body = batch::to_csv_bytes(&table)?;

    tracing::info!("batch prediction complete: {} rows", summary.rows);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(DOWNLOAD_DISPOSITION),
    );
    if !summary.missing_columns.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&summary.missing_columns.join(",")) {
            headers.insert(HeaderName::from_static(MISSING_COLUMNS_HEADER), value);
        }
    }

    Ok((StatusCode::OK, headers, body).into_response())
}
