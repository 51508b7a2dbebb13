//! Decides whether a booking mutation is worth a push notification.
//!
//! Pure: no I/O, no memory of earlier mutations.

use crate::db::{BookingSnapshot, BookingStatus, DocTimestamp};

/// The notification-worthy condition observed in one booking mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing relevant changed, the new status is not one we notify about,
    /// or the event was missing one of its snapshots.
    Unclassified,
    StatusChangedTo(BookingStatus),
    ScheduleChangedTo(DocTimestamp),
}

/// Classify a before/after pair.
///
/// A status change takes priority over a schedule change in the same
/// mutation. A status change to anything other than approved, in-progress,
/// completed or cancelled is dropped without falling through to the schedule
/// check. Schedules are compared by millisecond value and only when both
/// sides carry one.
pub fn classify(
    before: Option<&BookingSnapshot>,
    after: Option<&BookingSnapshot>,
) -> Classification {
    let (before, after) = match (before, after) {
        (Some(b), Some(a)) => (b, a),
        _ => return Classification::Unclassified,
    };

    if before.status != after.status {
        return match after.status.as_deref().and_then(BookingStatus::parse) {
            Some(
                status @ (BookingStatus::Approved
                | BookingStatus::InProgress
                | BookingStatus::Completed
                | BookingStatus::Cancelled),
            ) => Classification::StatusChangedTo(status),
            _ => Classification::Unclassified,
        };
    }

    match (before.scheduled_date_time, after.scheduled_date_time) {
        (Some(b), Some(a)) if b != a => Classification::ScheduleChangedTo(a),
        _ => Classification::Unclassified,
    }
}
