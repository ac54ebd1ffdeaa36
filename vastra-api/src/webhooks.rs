use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::json;

use vastra_shipping::webhook::{CarrierWebhook, WebhookError, WebhookOutcome};

use crate::state::AppState;

/// POST /v1/webhooks/shiprocket
/// Unauthenticated carrier callback. Responds 200 to everything except a
/// payload with no AWB, so provider retries stay bounded; internal failures
/// are logged and reported in the body instead of the status code.
pub async fn handle_shiprocket_webhook(
    State(state): State<AppState>,
    Json(payload): Json<CarrierWebhook>,
) -> (StatusCode, Json<serde_json::Value>) {
    tracing::info!(
        awb = payload.awb.as_deref().unwrap_or("-"),
        status = payload.current_status.as_deref().unwrap_or("-"),
        "Received carrier webhook"
    );

    match state.ingestor.ingest(&payload).await {
        Ok(WebhookOutcome::Applied {
            order_id,
            status,
            status_changed,
        }) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "order_id": order_id,
                "status": status,
                "status_changed": status_changed,
            })),
        ),
        Ok(WebhookOutcome::UnknownAwb) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "No matching order for AWB",
            })),
        ),
        Err(WebhookError::MissingAwb) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "awb is required",
            })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Webhook ingestion failed");
            (
                StatusCode::OK,
                Json(json!({
                    "success": false,
                    "error": err.to_string(),
                })),
            )
        }
    }
}
