use std::env;

use chrono_tz::Tz;
use serde::Deserialize;

pub const DEFAULT_LOCALE: &str = "en-PH";
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Asia::Manila;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub display: DisplayConfig,
    pub push: PushConfig,
    pub triggers: TriggerConfig,
    pub gemini: GeminiConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Locale and time zone used when a human-readable time is rendered into a
/// push message (currently only the reschedule body).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisplayConfig {
    pub locale: String,
    pub time_zone: Tz,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Overrides the `project_id` found in the service account file.
    pub project_id: Option<String>,
    /// Path to a Google service account JSON file.
    /// Read from `FCM_SERVICE_ACCOUNT_PATH`, then `GOOGLE_APPLICATION_CREDENTIALS`.
    pub service_account_path: Option<String>,
    /// Pre-issued OAuth2 access token; skips the service account exchange when set.
    pub access_token: Option<String>,
    /// Base URL of the FCM HTTP v1 API.
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// Shared secret for HMAC verification of trigger requests. Verification is
    /// skipped when unset.
    pub secret: Option<String>,
    /// How long a trigger request waits for its dispatch task before answering 202.
    pub dispatch_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for public endpoints (/logs, /ai)
    pub public_per_second: u32,
    /// Burst size for public endpoints
    pub public_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/app.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            display: DisplayConfig {
                locale: env::var("APP_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string()),
                time_zone: match env::var("APP_TIME_ZONE") {
                    Ok(v) => v
                        .parse::<Tz>()
                        .map_err(|_| ConfigError::InvalidValue("APP_TIME_ZONE".to_string()))?,
                    Err(_) => DEFAULT_TIME_ZONE,
                },
            },
            push: PushConfig {
                project_id: non_empty_var("FCM_PROJECT_ID"),
                service_account_path: non_empty_var("FCM_SERVICE_ACCOUNT_PATH")
                    .or_else(|| non_empty_var("GOOGLE_APPLICATION_CREDENTIALS")),
                access_token: non_empty_var("FCM_ACCESS_TOKEN"),
                endpoint: env::var("FCM_ENDPOINT")
                    .unwrap_or_else(|_| "https://fcm.googleapis.com".to_string()),
            },
            triggers: TriggerConfig {
                secret: non_empty_var("TRIGGER_SECRET"),
                dispatch_timeout_seconds: env::var("DISPATCH_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60u64),
            },
            gemini: GeminiConfig {
                api_key: non_empty_var("GEMINI_API_KEY"),
                api_url: env::var("GEMINI_API_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
                        .to_string()
                }),
                max_retries: env::var("GEMINI_MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3u32),
                initial_backoff_ms: env::var("GEMINI_INITIAL_BACKOFF_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .unwrap_or(1000u64),
                max_backoff_ms: env::var("GEMINI_MAX_BACKOFF_MS")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .unwrap_or(8000u64),
            },
            rate_limit: RateLimitConfig {
                public_per_second: env::var("RATE_LIMIT_PUBLIC_PER_SECOND")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
                public_burst: env::var("RATE_LIMIT_PUBLIC_BURST")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .unwrap_or(20),
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            locale: DEFAULT_LOCALE.to_string(),
            time_zone: DEFAULT_TIME_ZONE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://data/app.db".to_string(),
                max_connections: 5,
            },
            display: DisplayConfig::default(),
            push: PushConfig {
                project_id: None,
                service_account_path: None,
                access_token: None,
                endpoint: "https://fcm.googleapis.com".to_string(),
            },
            triggers: TriggerConfig {
                secret: None,
                dispatch_timeout_seconds: 60,
            },
            gemini: GeminiConfig {
                api_key: None,
                api_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent".to_string(),
                max_retries: 3,
                initial_backoff_ms: 1000,
                max_backoff_ms: 8000,
            },
            rate_limit: RateLimitConfig {
                public_per_second: 5,
                public_burst: 20,
            },
        }
    }
}
