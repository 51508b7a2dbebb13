//! Startup helpers: database connection + migrations and the push client.

use std::{path::Path, sync::Arc};

use anyhow::Result;

use crate::config::Config;
use crate::services::push::{FcmClient, PushSender};

/// Redact potentially sensitive information from a database URL before logging.
///
/// Userinfo (username:password) is dropped; unparseable URLs keep only what
/// follows the last '@', or become "(redacted)".
pub fn redact_db_url(db_url: &str) -> String {
    if let Ok(url) = url::Url::parse(db_url) {
        let scheme = url.scheme();
        let host = url.host_str().unwrap_or("");
        let port_part = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let path = url.path();
        format!("{}://{}{}{}", scheme, host, port_part, path)
    } else if let Some(at_pos) = db_url.rfind('@') {
        format!("(redacted){}", &db_url[at_pos + 1..])
    } else {
        "(redacted)".to_string()
    }
}

/// Open the SQLite pool (creating the file and its directory when missing)
/// and run migrations.
pub async fn init_db(config: &Config) -> Result<sqlx::SqlitePool> {
    let db_url = &config.database.url;
    tracing::info!("Connecting to database: {}", redact_db_url(db_url));

    let db_path = db_url.strip_prefix("sqlite://").unwrap_or(db_url);
    let db_file_path = Path::new(db_path);

    if let Some(parent) = db_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    let connect_options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Connected to database file: {}", db_file_path.display());

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Build the FCM client from configuration.
///
/// Missing credentials are not fatal: the service starts and every dispatch
/// reports a delivery failure. Present but broken credentials abort startup.
pub fn initialize_push(config: &Config) -> Result<Option<Arc<dyn PushSender>>> {
    match FcmClient::from_config(&config.push)? {
        Some(client) => {
            tracing::info!("FCM push client initialized");
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::warn!(
                "No FCM credentials configured (FCM_ACCESS_TOKEN or FCM_SERVICE_ACCOUNT_PATH); \
                 push notifications will not be delivered"
            );
            Ok(None)
        }
    }
}
