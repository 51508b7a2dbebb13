use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::config::DisplayConfig;
use crate::db::{BookingSnapshot, NotificationRecord};
use crate::services::classifier::classify;
use crate::services::gate::{self, DeliveryPath};
use crate::services::push::{PushMessage, PushSender, CLICK_ACTION};
use crate::services::recipients::{resolve_token, Resolution};
use crate::services::templates::{self, RenderedMessage};
use crate::AppState;

/// Machine-readable type tags carried by every push.
///
/// This is the single list of tags either trigger may send, and the only place
/// that decides which trigger owns which tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    General,
    BookingApproved,
    BookingInProgress,
    BookingCompleted,
    BookingCancelled,
    BookingRescheduled,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::General => "general",
            NotificationType::BookingApproved => "booking_approved",
            NotificationType::BookingInProgress => "booking_in_progress",
            NotificationType::BookingCompleted => "booking_completed",
            NotificationType::BookingCancelled => "booking_cancelled",
            NotificationType::BookingRescheduled => "booking_rescheduled",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "general" => Some(NotificationType::General),
            "booking_approved" => Some(NotificationType::BookingApproved),
            "booking_in_progress" => Some(NotificationType::BookingInProgress),
            "booking_completed" => Some(NotificationType::BookingCompleted),
            "booking_cancelled" => Some(NotificationType::BookingCancelled),
            "booking_rescheduled" => Some(NotificationType::BookingRescheduled),
            _ => None,
        }
    }

    pub fn delivery_path(&self) -> DeliveryPath {
        match self {
            NotificationType::General => DeliveryPath::NotificationRecord,
            NotificationType::BookingApproved
            | NotificationType::BookingInProgress
            | NotificationType::BookingCompleted
            | NotificationType::BookingCancelled
            | NotificationType::BookingRescheduled => DeliveryPath::BookingChange,
        }
    }
}

/// Why an invocation ended without sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MalformedEvent,
    Unclassified,
    NotPushOwned,
    MissingRecipient,
    NoUserRecord,
    MissingToken,
}

/// What one trigger invocation did. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent {
        message_id: String,
        notification_type: NotificationType,
    },
    Skipped {
        reason: SkipReason,
    },
    DeliveryFailed {
        error: String,
    },
}

impl DispatchOutcome {
    fn skipped(reason: SkipReason) -> Self {
        DispatchOutcome::Skipped { reason }
    }
}

/// Reacts to booking mutations and notification-record creations with at most
/// one push each. Holds no state between invocations.
pub struct NotificationService {
    pool: SqlitePool,
    push: Option<Arc<dyn PushSender>>,
    display: DisplayConfig,
}

impl NotificationService {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self::from_parts(
            state.db.clone(),
            state.push.clone(),
            state.config.display.clone(),
        )
    }

    pub fn from_parts(
        pool: SqlitePool,
        push: Option<Arc<dyn PushSender>>,
        display: DisplayConfig,
    ) -> Self {
        Self {
            pool,
            push,
            display,
        }
    }

    /// Booking-change path.
    pub async fn on_booking_updated(
        &self,
        booking_id: &str,
        before: Option<&BookingSnapshot>,
        after: Option<&BookingSnapshot>,
    ) -> DispatchOutcome {
        let after_snapshot = match (before, after) {
            (Some(_), Some(a)) => a,
            _ => return DispatchOutcome::skipped(SkipReason::MalformedEvent),
        };

        let classification = classify(before, after);
        let rendered = match templates::render_booking(&classification, &self.display) {
            Some(m) => m,
            None => return DispatchOutcome::skipped(SkipReason::Unclassified),
        };

        let email = match gate::admit_booking(
            &classification,
            rendered.notification_type,
            after_snapshot,
        ) {
            Ok(email) => email,
            Err(reason) => return DispatchOutcome::skipped(reason),
        };

        tracing::debug!(
            "Booking {} classified as {:?}, notifying {}",
            booking_id,
            classification,
            email
        );

        let mut data = BTreeMap::new();
        data.insert("bookingId".to_string(), booking_id.to_string());
        data.insert(
            "status".to_string(),
            after_snapshot.status.clone().unwrap_or_default(),
        );
        data.insert(
            "type".to_string(),
            rendered.notification_type.as_str().to_string(),
        );
        data.insert("click_action".to_string(), CLICK_ACTION.to_string());
        data.insert(
            "rescheduledAt".to_string(),
            after_snapshot
                .scheduled_date_time
                .map(|ts| ts.millis().to_string())
                .unwrap_or_default(),
        );

        self.resolve_and_send("booking", booking_id, email, rendered, data)
            .await
    }

    /// Notification-record path.
    pub async fn on_notification_created(
        &self,
        notification_id: &str,
        record: Option<&NotificationRecord>,
    ) -> DispatchOutcome {
        let record = match record {
            Some(r) => r,
            None => return DispatchOutcome::skipped(SkipReason::MalformedEvent),
        };

        let (notification_type, email) = match gate::admit_record(record) {
            Ok(admitted) => admitted,
            Err(reason) => {
                tracing::debug!(
                    "Notification {} not pushed ({:?}, type={:?})",
                    notification_id,
                    reason,
                    record.notification_type
                );
                return DispatchOutcome::skipped(reason);
            }
        };

        let rendered = templates::render_general(record);
        debug_assert_eq!(rendered.notification_type, notification_type);

        let mut data = BTreeMap::new();
        data.insert(
            "type".to_string(),
            notification_type.as_str().to_string(),
        );
        data.insert("click_action".to_string(), CLICK_ACTION.to_string());
        data.insert("notificationId".to_string(), notification_id.to_string());

        self.resolve_and_send("notification", notification_id, email, rendered, data)
            .await
    }

    async fn resolve_and_send(
        &self,
        record_kind: &str,
        record_id: &str,
        email: &str,
        rendered: RenderedMessage,
        data: BTreeMap<String, String>,
    ) -> DispatchOutcome {
        let token = match resolve_token(&self.pool, email).await {
            Ok(Resolution::Token(token)) => token,
            Ok(Resolution::NoUserRecord) => {
                return DispatchOutcome::skipped(SkipReason::NoUserRecord)
            }
            Ok(Resolution::MissingToken) => {
                return DispatchOutcome::skipped(SkipReason::MissingToken)
            }
            Err(e) => {
                tracing::error!(
                    "Error resolving push token for {} {}: {}",
                    record_kind,
                    record_id,
                    e
                );
                return DispatchOutcome::DeliveryFailed {
                    error: e.to_string(),
                };
            }
        };

        let message = PushMessage {
            token,
            title: rendered.title,
            body: rendered.body,
            data,
        };

        self.deliver(record_kind, record_id, rendered.notification_type, &message)
            .await
    }

    /// One send attempt. Failures are logged with the record id and swallowed;
    /// there is no retry.
    async fn deliver(
        &self,
        record_kind: &str,
        record_id: &str,
        notification_type: NotificationType,
        message: &PushMessage,
    ) -> DispatchOutcome {
        let push = match &self.push {
            Some(p) => p.clone(),
            None => {
                tracing::error!(
                    "Error sending notification for {} {}: Push service not initialized",
                    record_kind,
                    record_id
                );
                return DispatchOutcome::DeliveryFailed {
                    error: "Push service not initialized".to_string(),
                };
            }
        };

        match push.send(message).await {
            Ok(message_id) => {
                tracing::info!(
                    "Sent {} push for {} {} ({})",
                    notification_type.as_str(),
                    record_kind,
                    record_id,
                    message_id
                );
                DispatchOutcome::Sent {
                    message_id,
                    notification_type,
                }
            }
            Err(e) => {
                tracing::error!(
                    "Error sending notification for {} {}: {}",
                    record_kind,
                    record_id,
                    e
                );
                DispatchOutcome::DeliveryFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}
