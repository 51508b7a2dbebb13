use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::services::backfill::backfill_customer_emails;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/backfill-customer-emails", post(backfill))
}

async fn backfill(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let summary = backfill_customer_emails(&state.db).await?;
    Ok(Json(json!({ "success": true, "summary": summary })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::db::{CreateTransaction, TransactionRepository};
    use crate::routes::test_support::test_state;

    #[tokio::test]
    async fn returns_summary() {
        let state = test_state(None).await;
        TransactionRepository::create(
            &state.db,
            CreateTransaction {
                id: "tx1".to_string(),
                customer_email: None,
                vehicle_plate_number: None,
                transaction_at: None,
            },
        )
        .await
        .unwrap();

        let response = router()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/backfill-customer-emails")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "summary": {"total": 1, "missing": 1, "updated": 0, "no_booking": 1, "failed": 0}
            })
        );
    }
}
