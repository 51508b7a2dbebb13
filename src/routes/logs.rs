use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{CreateErrorLog, ErrorLogRepository};
use crate::error::AppResult;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/web-error", post(log_web_error))
}

/// Error report sent by the web client when it cannot write the log itself.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebErrorReport {
    pub error: Option<String>,
    pub stack_trace: Option<String>,
    pub context: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub additional_data: Option<Value>,
    pub fatal: Option<bool>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

async fn log_web_error(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(report): Json<WebErrorReport>,
) -> AppResult<Json<Value>> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string();
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let additional_data = match report.additional_data {
        Some(Value::Null) | None => json!({}),
        Some(v) => v,
    };

    let log = ErrorLogRepository::create(
        &state.db,
        CreateErrorLog {
            error: or_default(report.error, "Unknown error"),
            stack_trace: report.stack_trace.filter(|s| !s.is_empty()),
            context: or_default(report.context, "unknown"),
            user_id: or_default(report.user_id, "anonymous"),
            user_email: or_default(report.user_email, "unknown"),
            platform: "web".to_string(),
            fatal: report.fatal.unwrap_or(false),
            additional_data,
            user_agent,
            ip,
        },
    )
    .await?;

    tracing::info!(
        "Web error logged: {} (user={}, error={})",
        log.context,
        log.user_id,
        log.error
    );

    Ok(Json(json!({ "success": true })))
}
