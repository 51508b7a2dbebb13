//! Proxy to the Gemini `generateContent` API for analytics summaries.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    config: GeminiConfig,
}

/// Delay before attempt `attempt` (0-based): none for the first attempt, then
/// `initial * 2^(attempt-1)` capped at `cap`.
pub fn backoff_delay(attempt: u32, initial_ms: u64, cap_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    Duration::from_millis(initial_ms.saturating_mul(factor).min(cap_ms))
}

impl GeminiService {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Generate a summary for `prompt`, retrying on 503/429 and network errors.
    pub async fn generate_summary(&self, prompt: &str) -> AppResult<String> {
        let api_key = match &self.config.api_key {
            Some(k) => k,
            None => {
                tracing::error!("GEMINI_API_KEY not configured");
                return Err(AppError::Config("API key not configured".to_string()));
            }
        };

        let max_retries = self.config.max_retries.max(1);
        let payload = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        for attempt in 0..max_retries {
            if attempt > 0 {
                let delay = backoff_delay(
                    attempt,
                    self.config.initial_backoff_ms,
                    self.config.max_backoff_ms,
                );
                tracing::info!(
                    "Retry attempt {}/{} after {}ms",
                    attempt + 1,
                    max_retries,
                    delay.as_millis()
                );
                sleep(delay).await;
            }

            let last_error = match self.attempt(api_key, &payload).await {
                Ok(Attempt::Done(summary)) => return Ok(summary),
                Ok(Attempt::Retryable(reason)) => {
                    tracing::warn!("Attempt {} failed: {}", attempt + 1, reason);
                    continue;
                }
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Transport(e)) => e,
            };

            tracing::error!("Attempt {} error: {}", attempt + 1, last_error);
            if attempt == max_retries - 1 {
                return Err(AppError::Gemini(format!(
                    "Error after {} attempts: {}",
                    max_retries, last_error
                )));
            }
        }

        Err(AppError::ServiceUnavailable(format!(
            "Service unavailable after {} retries. Please try again later.",
            max_retries
        )))
    }

    async fn attempt(&self, api_key: &str, payload: &Value) -> Result<Attempt, Failure> {
        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-goog-api-key", api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| Failure::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::SERVICE_UNAVAILABLE => {
                return Ok(Attempt::Retryable(
                    "Service temporarily unavailable (503)".to_string(),
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Ok(Attempt::Retryable("Rate limit exceeded (429)".to_string()))
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                tracing::error!("Gemini API error: {}", text);
                return Err(Failure::Fatal(AppError::Gemini(format!(
                    "Gemini API error: {}",
                    text
                ))));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Failure::Transport(e.to_string()))?;

        extract_summary(&body)
            .map(Attempt::Done)
            .ok_or_else(|| Failure::Fatal(AppError::Gemini("No summary generated".to_string())))
    }
}

enum Attempt {
    Done(String),
    Retryable(String),
}

enum Failure {
    Fatal(AppError),
    Transport(String),
}

fn extract_summary(body: &Value) -> Option<String> {
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
