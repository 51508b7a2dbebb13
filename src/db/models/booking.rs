use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp::DocTimestamp;

/// Lifecycle states a booking moves through. Transitions are driven by other
/// parts of the system and are not validated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "approved" => Some(BookingStatus::Approved),
            "in-progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// A booking document as delivered by a change trigger (before or after image).
///
/// `status` stays a raw string: any observed change is trusted, including
/// values this service does not know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingSnapshot {
    pub status: Option<String>,
    pub scheduled_date_time: Option<DocTimestamp>,
    pub user_email: Option<String>,
}

impl BookingSnapshot {
    pub fn recipient_email(&self) -> Option<&str> {
        self.user_email.as_deref().filter(|e| !e.is_empty())
    }
}

/// A stored booking row, read by the maintenance jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub status: Option<String>,
    /// Epoch milliseconds.
    pub scheduled_date_time: Option<i64>,
    pub user_email: Option<String>,
    pub transaction_id: Option<String>,
    pub plate_number: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn usable_email(&self) -> Option<&str> {
        self.user_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub id: String,
    pub status: Option<String>,
    pub scheduled_date_time: Option<i64>,
    pub user_email: Option<String>,
    pub transaction_id: Option<String>,
    pub plate_number: Option<String>,
}
