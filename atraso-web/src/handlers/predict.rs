//! Single-record prediction handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};
use atraso_core::{fields, inference, record};

/// Result messages rendered by the original interface.
const RISK_MESSAGE: &str = "Este estudiante está en riesgo de atraso escolar según el modelo.";
const NO_RISK_MESSAGE: &str = "Este estudiante no está en riesgo de atraso escolar según el modelo.";

#[derive(Serialize)]
pub struct PredictResponse {
    proba_atraso: f64,
    pred_int: u8,
    pred_label: &'static str,
    message: &'static str,
}

/// Predict one student record submitted from the form.
///
/// The submission must cover every form field with a value inside its
/// domain; unknown keys are rejected.
pub async fn single(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<PredictResponse>> {
    let object = body
        .as_object()
        .ok_or_else(|| AppError::BadRequest("expected a JSON object of field values".to_string()))?;
    let record = record::from_json_object(object).map_err(AppError::from)?;

    if let Err(problems) = fields::validate_record(&record) {
        return Err(AppError::ValidationError(problems.join("; ")));
    }

    let prediction = inference::predict_record(state.pipeline.as_ref(), &record)?;
    tracing::debug!(
        "prediction: {} (p = {:.3})",
        prediction.label,
        prediction.probability
    );

    let message = if prediction.decision == 1 {
        RISK_MESSAGE
    } else {
        NO_RISK_MESSAGE
    };

    Ok(Json(PredictResponse {
        proba_atraso: prediction.probability,
        pred_int: prediction.decision,
        pred_label: prediction.label,
        message,
    }))
}
