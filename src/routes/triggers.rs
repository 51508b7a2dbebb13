use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::services::notifications::{DispatchOutcome, NotificationService};
use crate::services::triggers::{BookingUpdatedEvent, NotificationCreatedEvent, TriggerService};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings/:booking_id/updated", post(booking_updated))
        .route(
            "/notifications/:notification_id/created",
            post(notification_created),
        )
        .route("/users/:user_id/deleted", post(user_deleted))
        .route("/users/:user_id/updated", post(user_updated))
}

async fn booking_updated(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    TriggerService::authenticate(&state, &headers, &body)?;

    let event: BookingUpdatedEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;

    tracing::info!("Received booking update trigger for {}", booking_id);

    let service = NotificationService::new(&state);
    let label = format!("Booking {}", booking_id);
    let outcome = TriggerService::run_invocation(&state, label, async move {
        service
            .on_booking_updated(&booking_id, event.before.as_ref(), event.after.as_ref())
            .await
    })
    .await;

    Ok(outcome_response(outcome))
}

async fn notification_created(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    TriggerService::authenticate(&state, &headers, &body)?;

    let event: NotificationCreatedEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))?;

    tracing::info!("Received notification created trigger for {}", notification_id);

    let service = NotificationService::new(&state);
    let label = format!("Notification {}", notification_id);
    let outcome = TriggerService::run_invocation(&state, label, async move {
        service
            .on_notification_created(&notification_id, event.data.as_ref())
            .await
    })
    .await;

    Ok(outcome_response(outcome))
}

// Device tokens live on the user document, so deleting or updating a user
// needs no cleanup here.
async fn user_deleted(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    TriggerService::authenticate(&state, &headers, &body)?;
    tracing::debug!("User {} deleted; nothing to do", user_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn user_updated(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    TriggerService::authenticate(&state, &headers, &body)?;
    tracing::debug!("User {} updated; nothing to do", user_id);
    Ok(StatusCode::NO_CONTENT)
}

fn outcome_response(outcome: Option<DispatchOutcome>) -> Response {
    match outcome {
        Some(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        None => (
            StatusCode::ACCEPTED,
            Json(json!({ "outcome": "pending" })),
        )
            .into_response(),
    }
}
