//! Fulfillment endpoint.
//!
//! The platform expects `200 OK` with a fulfillment body no matter what went
//! wrong, so the body is taken as raw bytes and every failure, including a
//! body that is not JSON, is answered with the error payload.

use axum::{Json, body::Bytes, extract::State};
use tracing::{instrument, warn};
use weather_core::{WebhookError, WebhookRequest, WebhookResponse};

use crate::state::AppState;

/// POST /webhook
#[instrument(skip_all)]
pub async fn fulfill(State(state): State<AppState>, body: Bytes) -> Json<WebhookResponse> {
    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejecting malformed webhook body");
            return Json(WebhookError::MalformedRequest(e.to_string()).into());
        }
    };

    Json(state.service.handle(&request).await)
}
