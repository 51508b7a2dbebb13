use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub customer_email: Option<String>,
    pub vehicle_plate_number: Option<String>,
    /// Epoch milliseconds.
    pub transaction_at: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    pub fn is_missing_email(&self) -> bool {
        self.customer_email
            .as_deref()
            .map(|e| e.trim().is_empty())
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub id: String,
    pub customer_email: Option<String>,
    pub vehicle_plate_number: Option<String>,
    pub transaction_at: Option<i64>,
}
