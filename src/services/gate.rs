//! Decides whether a trigger invocation may send a push at all.
//!
//! Two independent triggers observe overlapping events: a booking mutation and
//! the in-app notification record the app writes for the same change. Each
//! type tag is owned by exactly one of them (see
//! [`NotificationType::delivery_path`]), so a logical event is pushed at most
//! once without any runtime coordination.

use crate::db::{BookingSnapshot, NotificationRecord};
use crate::services::classifier::Classification;
use crate::services::notifications::{NotificationType, SkipReason};

/// The trigger responsible for pushing a given type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    BookingChange,
    NotificationRecord,
}

/// Booking path: passes when the mutation was classified and the after
/// snapshot names a recipient. Returns the recipient email.
pub fn admit_booking<'a>(
    classification: &Classification,
    notification_type: NotificationType,
    after: &'a BookingSnapshot,
) -> Result<&'a str, SkipReason> {
    if *classification == Classification::Unclassified {
        return Err(SkipReason::Unclassified);
    }
    if notification_type.delivery_path() != DeliveryPath::BookingChange {
        return Err(SkipReason::NotPushOwned);
    }
    after.recipient_email().ok_or(SkipReason::MissingRecipient)
}

/// Notification-record path: passes only for tags owned by this path and a
/// present recipient. A missing tag counts as `general`.
pub fn admit_record(record: &NotificationRecord) -> Result<(NotificationType, &str), SkipReason> {
    let notification_type = match record.type_tag() {
        None => NotificationType::General,
        Some(tag) => NotificationType::parse(tag).ok_or(SkipReason::NotPushOwned)?,
    };
    if notification_type.delivery_path() != DeliveryPath::NotificationRecord {
        return Err(SkipReason::NotPushOwned);
    }
    let email = record
        .recipient_email()
        .ok_or(SkipReason::MissingRecipient)?;
    Ok((notification_type, email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BookingStatus, DocTimestamp};

    fn record(tag: Option<&str>, user: Option<&str>) -> NotificationRecord {
        NotificationRecord {
            user_id: user.map(|s| s.to_string()),
            notification_type: tag.map(|s| s.to_string()),
            title: None,
            message: None,
        }
    }

    #[test]
    fn every_booking_tag_is_owned_by_the_booking_path() {
        for ty in [
            NotificationType::BookingApproved,
            NotificationType::BookingInProgress,
            NotificationType::BookingCompleted,
            NotificationType::BookingCancelled,
            NotificationType::BookingRescheduled,
        ] {
            assert_eq!(ty.delivery_path(), DeliveryPath::BookingChange);
            let rec = record(Some(ty.as_str()), Some("a@x.com"));
            let res = admit_record(&rec);
            assert_eq!(res, Err(SkipReason::NotPushOwned), "tag {}", ty.as_str());
        }
        assert_eq!(
            NotificationType::General.delivery_path(),
            DeliveryPath::NotificationRecord
        );
    }

    #[test]
    fn general_record_with_recipient_passes() {
        let rec = record(Some("general"), Some("a@x.com"));
        assert_eq!(
            admit_record(&rec),
            Ok((NotificationType::General, "a@x.com"))
        );
        let untagged = record(None, Some("a@x.com"));
        assert_eq!(
            admit_record(&untagged),
            Ok((NotificationType::General, "a@x.com"))
        );
    }

    #[test]
    fn unknown_tags_and_missing_recipients_are_rejected() {
        assert_eq!(
            admit_record(&record(Some("promo"), Some("a@x.com"))),
            Err(SkipReason::NotPushOwned)
        );
        assert_eq!(
            admit_record(&record(Some("general"), None)),
            Err(SkipReason::MissingRecipient)
        );
    }

    #[test]
    fn booking_gate_requires_classification_and_recipient() {
        let mut after = BookingSnapshot {
            status: Some("approved".to_string()),
            scheduled_date_time: Some(DocTimestamp::from_millis(1)),
            user_email: Some("a@x.com".to_string()),
        };
        let approved = Classification::StatusChangedTo(BookingStatus::Approved);

        assert_eq!(
            admit_booking(&approved, NotificationType::BookingApproved, &after),
            Ok("a@x.com")
        );
        assert_eq!(
            admit_booking(
                &Classification::Unclassified,
                NotificationType::BookingApproved,
                &after
            ),
            Err(SkipReason::Unclassified)
        );
        assert_eq!(
            admit_booking(&approved, NotificationType::General, &after),
            Err(SkipReason::NotPushOwned)
        );

        after.user_email = None;
        assert_eq!(
            admit_booking(&approved, NotificationType::BookingApproved, &after),
            Err(SkipReason::MissingRecipient)
        );
    }
}
