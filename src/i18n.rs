/*
Message catalog for user-facing push text.

This module provides:
- A tiny embedded catalog (compile-time embedded JSON) for the app's single
  display language.
- `t` to look up a message by key and `t_with` to substitute `{name}`
  placeholders.

Usage:
    use crate::i18n;
    let title = i18n::t("booking.approved.title");
    let body = i18n::t_with("booking.rescheduled.body", &[("when", "Oct 16, 2026, 03:30 PM")]);

Notes:
- Missing keys resolve to the key itself, which keeps gaps visible in logs.
*/

use std::collections::HashMap;
use std::sync::OnceLock;

static CATALOG: OnceLock<HashMap<String, String>> = OnceLock::new();

const EN_JSON: &str = r#"
{
  "app.name": "EC Carwash",
  "notification.default_body": "You have a new notification",
  "booking.approved.title": "Booking Confirmed!",
  "booking.approved.body": "Your booking has been successfully approved. Kindly ensure timely arrival, as bookings will be automatically cancelled if you are more than 10 minutes late.",
  "booking.in_progress.title": "Service Started",
  "booking.in_progress.body": "Your vehicle service is now in progress.",
  "booking.completed.title": "Service Completed",
  "booking.completed.body": "Your vehicle service has been completed. Thank you for choosing EC Carwash!",
  "booking.cancelled.title": "Booking Cancelled",
  "booking.cancelled.body": "Your booking has been cancelled.",
  "booking.rescheduled.title": "Booking Rescheduled",
  "booking.rescheduled.body": "Your booking has been rescheduled to {when}.",
  "booking.rescheduled.unknown_time": "a new time"
}
"#;

fn build_catalog() -> HashMap<String, String> {
    serde_json::from_str(EN_JSON).unwrap_or_else(|e| {
        panic!("failed to parse EN_JSON in i18n module: {}", e);
    })
}

fn catalog() -> &'static HashMap<String, String> {
    CATALOG.get_or_init(build_catalog)
}

/// Look up `key`, replacing `{name}` placeholders from `params`.
///
/// Returns the key itself when the catalog has no entry for it.
pub fn tr(key: &str, params: Option<&[(&str, &str)]>) -> String {
    let val = catalog()
        .get(key)
        .cloned()
        .unwrap_or_else(|| key.to_string());

    if let Some(params) = params {
        let mut s = val;
        for (k, v) in params {
            s = s.replace(&format!("{{{}}}", k), v);
        }
        s
    } else {
        val
    }
}

pub fn t(key: &str) -> String {
    tr(key, None)
}

pub fn t_with(key: &str, params: &[(&str, &str)]) -> String {
    tr(key, Some(params))
}
