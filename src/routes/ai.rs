use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/summary", post(summary))
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let prompt = request
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing prompt".to_string()))?;

    tracing::info!("Generating AI summary ({} chars of prompt)", prompt.len());

    let summary = state.gemini.generate_summary(&prompt).await?;
    Ok(Json(SummaryResponse { summary }))
}
