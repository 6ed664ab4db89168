use axum::{http::StatusCode, Json};

use crate::models::AlertResponse;
use crate::payload::AlertPayload;
use crate::ALERT_LOG_TARGET;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// Logs the alert and echoes it back untouched. Any valid JSON is accepted.
pub async fn alert(payload: AlertPayload) -> Json<AlertResponse> {
    tracing::info!(target: ALERT_LOG_TARGET, "ALERT: {payload}");
    Json(AlertResponse::sent(payload))
}
