use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::db::{BookingSnapshot, NotificationRecord};
use crate::error::{AppError, AppResult};
use crate::services::notifications::DispatchOutcome;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const TRIGGER_EVENT_ID_HEADER: &str = "x-trigger-event-id";
pub const TRIGGER_TIMESTAMP_HEADER: &str = "x-trigger-timestamp";
pub const TRIGGER_SIGNATURE_HEADER: &str = "x-trigger-signature";

/// Before/after images of one booking document.
#[derive(Debug, Deserialize)]
pub struct BookingUpdatedEvent {
    #[serde(default)]
    pub before: Option<BookingSnapshot>,
    #[serde(default)]
    pub after: Option<BookingSnapshot>,
}

/// The freshly created notification document.
#[derive(Debug, Deserialize)]
pub struct NotificationCreatedEvent {
    #[serde(default)]
    pub data: Option<NotificationRecord>,
}

pub struct TriggerService;

impl TriggerService {
    /// Check the HMAC signature of a trigger request when a secret is configured.
    pub fn authenticate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> AppResult<()> {
        let secret = match &state.config.triggers.secret {
            Some(s) => s,
            None => return Ok(()),
        };

        let event_id = Self::get_header(headers, TRIGGER_EVENT_ID_HEADER)?;
        let timestamp = Self::get_header(headers, TRIGGER_TIMESTAMP_HEADER)?;
        let signature = Self::get_header(headers, TRIGGER_SIGNATURE_HEADER)?;

        Self::verify_signature(secret, &event_id, &timestamp, body, &signature)
    }

    /// HMAC-SHA256 over `event_id || timestamp || body`, hex encoded with a
    /// `sha256=` prefix. Messages older than 10 minutes are rejected.
    pub fn verify_signature(
        secret: &str,
        event_id: &str,
        timestamp: &str,
        body: &[u8],
        signature: &str,
    ) -> AppResult<()> {
        let mut message = Vec::new();
        message.extend_from_slice(event_id.as_bytes());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to create HMAC")))?;

        mac.update(&message);

        let expected_sig = if let Some(hex_sig) = signature.strip_prefix("sha256=") {
            hex::decode(hex_sig)
                .map_err(|_| AppError::BadRequest("Invalid signature format".to_string()))?
        } else {
            return Err(AppError::BadRequest("Invalid signature format".to_string()));
        };

        mac.verify_slice(&expected_sig)
            .map_err(|_| AppError::Unauthorized)?;

        let msg_time = chrono::DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| AppError::BadRequest("Invalid timestamp".to_string()))?;
        let diff = chrono::Utc::now().signed_duration_since(msg_time);
        if diff.num_minutes().abs() > 10 {
            return Err(AppError::BadRequest("Message too old".to_string()));
        }

        Ok(())
    }

    fn get_header(headers: &HeaderMap, name: &str) -> AppResult<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::BadRequest(format!("Missing header: {}", name)))
    }

    /// Run one invocation on its own task and wait up to the configured budget.
    ///
    /// `None` means the budget elapsed; the task keeps running to completion so
    /// an in-flight send is never cancelled.
    pub async fn run_invocation<F>(
        state: &Arc<AppState>,
        label: String,
        invocation: F,
    ) -> Option<DispatchOutcome>
    where
        F: Future<Output = DispatchOutcome> + Send + 'static,
    {
        let budget = Duration::from_secs(state.config.triggers.dispatch_timeout_seconds);
        let handle = tokio::spawn(invocation);

        match tokio::time::timeout(budget, handle).await {
            Ok(Ok(outcome)) => {
                tracing::info!("{} finished: {:?}", label, outcome);
                Some(outcome)
            }
            Ok(Err(join_err)) => {
                tracing::error!("{} panicked: {}", label, join_err);
                Some(DispatchOutcome::DeliveryFailed {
                    error: "invocation panicked".to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(
                    "{} still running after {}s; leaving it to finish in the background",
                    label,
                    budget.as_secs()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, event_id: &str, timestamp: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(event_id.as_bytes());
        mac.update(timestamp.as_bytes());
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let ts = chrono::Utc::now().to_rfc3339();
        let body = br#"{"before":null,"after":null}"#;
        let sig = sign("s3cret", "evt-1", &ts, body);
        assert!(TriggerService::verify_signature("s3cret", "evt-1", &ts, body, &sig).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let ts = chrono::Utc::now().to_rfc3339();
        let sig = sign("s3cret", "evt-1", &ts, b"{}");
        assert!(matches!(
            TriggerService::verify_signature("s3cret", "evt-1", &ts, b"{\"x\":1}", &sig),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_stale_and_malformed_signatures() {
        let old = (chrono::Utc::now() - chrono::Duration::minutes(30)).to_rfc3339();
        let sig = sign("s3cret", "evt-1", &old, b"{}");
        assert!(matches!(
            TriggerService::verify_signature("s3cret", "evt-1", &old, b"{}", &sig),
            Err(AppError::BadRequest(_))
        ));

        let ts = chrono::Utc::now().to_rfc3339();
        assert!(matches!(
            TriggerService::verify_signature("s3cret", "evt-1", &ts, b"{}", "md5=abc"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn booking_event_tolerates_missing_snapshots() {
        let event: BookingUpdatedEvent =
            serde_json::from_value(serde_json::json!({"after": {"status": "approved"}})).unwrap();
        assert!(event.before.is_none());
        assert_eq!(event.after.unwrap().status.as_deref(), Some("approved"));
    }
}
