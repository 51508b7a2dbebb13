use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A document-store timestamp normalized to epoch milliseconds.
///
/// Two timestamps are equal iff their millisecond values are equal, regardless
/// of the wire shape they arrived in. Accepted shapes:
/// - integer or fractional epoch milliseconds (`1760600000000`)
/// - `{"seconds": .., "nanoseconds": ..}` or the admin SDK's
///   `{"_seconds": .., "_nanoseconds": ..}`
/// - RFC 3339 strings (`"2026-10-16T07:30:00Z"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocTimestamp(i64);

impl DocTimestamp {
    pub fn from_millis(millis: i64) -> Self {
        DocTimestamp(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// `None` when the value lies outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Parts {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(alias = "_nanoseconds", default)]
        nanoseconds: i64,
    },
    Text(String),
}

impl<'de> Deserialize<'de> for DocTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(ms) => ms,
            RawTimestamp::FractionalMillis(ms) => ms.floor() as i64,
            RawTimestamp::Parts {
                seconds,
                nanoseconds,
            } => seconds
                .checked_mul(1000)
                .and_then(|ms| ms.checked_add(nanoseconds.div_euclid(1_000_000)))
                .ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "timestamp out of range: {} seconds",
                        seconds
                    ))
                })?,
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", s, e)))?,
        };
        Ok(DocTimestamp(millis))
    }
}
