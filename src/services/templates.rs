//! Maps a classified condition to the title, body and type tag of a push.

use crate::config::DisplayConfig;
use crate::db::{BookingStatus, DocTimestamp, NotificationRecord};
use crate::i18n;
use crate::services::classifier::Classification;
use crate::services::notifications::NotificationType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
}

/// Message for a classified booking mutation; `None` when unclassified.
pub fn render_booking(
    classification: &Classification,
    display: &DisplayConfig,
) -> Option<RenderedMessage> {
    match classification {
        Classification::Unclassified => None,
        Classification::StatusChangedTo(status) => render_status(*status),
        Classification::ScheduleChangedTo(ts) => Some(render_rescheduled(Some(*ts), display)),
    }
}

fn render_status(status: BookingStatus) -> Option<RenderedMessage> {
    let (key, notification_type) = match status {
        BookingStatus::Approved => ("booking.approved", NotificationType::BookingApproved),
        BookingStatus::InProgress => ("booking.in_progress", NotificationType::BookingInProgress),
        BookingStatus::Completed => ("booking.completed", NotificationType::BookingCompleted),
        BookingStatus::Cancelled => ("booking.cancelled", NotificationType::BookingCancelled),
        BookingStatus::Pending => return None,
    };

    Some(RenderedMessage {
        title: i18n::t(&format!("{}.title", key)),
        body: i18n::t(&format!("{}.body", key)),
        notification_type,
    })
}

/// Reschedule message. The body names the new time in the configured locale
/// and zone, or "a new time" when it is unknown or unrepresentable.
pub fn render_rescheduled(new_time: Option<DocTimestamp>, display: &DisplayConfig) -> RenderedMessage {
    let when = new_time
        .and_then(|ts| format_when(ts, display))
        .unwrap_or_else(|| i18n::t("booking.rescheduled.unknown_time"));

    RenderedMessage {
        title: i18n::t("booking.rescheduled.title"),
        body: i18n::t_with("booking.rescheduled.body", &[("when", &when)]),
        notification_type: NotificationType::BookingRescheduled,
    }
}

/// Message for a generic in-app notification record, falling back to the app
/// name and a stock body.
pub fn render_general(record: &NotificationRecord) -> RenderedMessage {
    RenderedMessage {
        title: record
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| i18n::t("app.name")),
        body: record
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| i18n::t("notification.default_body")),
        notification_type: NotificationType::General,
    }
}

/// Short month, two-digit day, numeric year, 12-hour clock.
pub fn format_when(ts: DocTimestamp, display: &DisplayConfig) -> Option<String> {
    let local = ts.to_datetime()?.with_timezone(&display.time_zone);
    Some(local.format(pattern_for(&display.locale)).to_string())
}

fn pattern_for(locale: &str) -> &'static str {
    match locale.to_ascii_lowercase().replace('_', "-").as_str() {
        "en-gb" | "en-au" | "en-nz" | "en-ie" | "en-in" => "%d %b %Y, %I:%M %P",
        "en-ph" | "en-us" | "en" => "%b %d, %Y, %I:%M %p",
        other => {
            tracing::debug!("No date pattern for locale {}, using en-PH", other);
            "%b %d, %Y, %I:%M %p"
        }
    }
}
