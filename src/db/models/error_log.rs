use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLog {
    pub id: String,
    pub error: String,
    pub stack_trace: Option<String>,
    pub context: String,
    pub user_id: String,
    pub user_email: String,
    pub platform: String,
    pub fatal: bool,
    /// Serialized JSON object.
    pub additional_data: String,
    pub user_agent: String,
    pub ip: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateErrorLog {
    pub error: String,
    pub stack_trace: Option<String>,
    pub context: String,
    pub user_id: String,
    pub user_email: String,
    pub platform: String,
    pub fatal: bool,
    pub additional_data: serde_json::Value,
    pub user_agent: String,
    pub ip: String,
}
