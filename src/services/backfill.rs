//! Fills in `customer_email` on transactions that lack one, using the linked
//! booking's `user_email`.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{BookingRepository, Transaction, TransactionRepository};
use crate::error::AppResult;

/// Bookings for the same plate within this distance of the transaction time
/// are considered a match.
const PLATE_MATCH_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub total: usize,
    pub missing: usize,
    pub updated: usize,
    pub no_booking: usize,
    pub failed: usize,
}

pub async fn backfill_customer_emails(pool: &SqlitePool) -> AppResult<BackfillSummary> {
    tracing::info!("Backfilling customer emails from bookings");

    let transactions = TransactionRepository::find_all(pool).await?;
    let missing: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.is_missing_email())
        .collect();

    tracing::info!(
        "Total: {}, Missing: {}",
        transactions.len(),
        missing.len()
    );

    let mut summary = BackfillSummary {
        total: transactions.len(),
        missing: missing.len(),
        ..Default::default()
    };

    for tx in missing {
        match backfill_one(pool, tx).await {
            Ok(true) => summary.updated += 1,
            Ok(false) => {
                summary.no_booking += 1;
                tracing::warn!("No booking found for transaction {}", tx.id);
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed to backfill transaction {}: {}", tx.id, e);
            }
        }
    }

    tracing::info!("Backfill complete: {:?}", summary);
    Ok(summary)
}

/// Returns `Ok(true)` when an email was written.
async fn backfill_one(pool: &SqlitePool, tx: &Transaction) -> AppResult<bool> {
    if let Some(booking) = BookingRepository::find_first_by_transaction_id(pool, &tx.id).await? {
        if let Some(email) = booking.usable_email() {
            TransactionRepository::update_customer_email(pool, &tx.id, email).await?;
            tracing::info!("Updated {} with {} (via transactionId)", tx.id, email);
            return Ok(true);
        }
    }

    let plate = tx
        .vehicle_plate_number
        .as_deref()
        .filter(|p| !p.is_empty());
    if let (Some(plate), Some(at)) = (plate, tx.transaction_at) {
        let candidates = BookingRepository::find_by_plate_between(
            pool,
            plate,
            at - PLATE_MATCH_WINDOW_MS,
            at + PLATE_MATCH_WINDOW_MS,
        )
        .await?;

        // Only the first match is considered.
        if let Some(email) = candidates.first().and_then(|b| b.usable_email()) {
            TransactionRepository::update_customer_email(pool, &tx.id, email).await?;
            tracing::info!("Updated {} with {} (via plate+date)", tx.id, email);
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool::memory_pool;
    use crate::db::{CreateBooking, CreateTransaction};

    const HOUR_MS: i64 = 60 * 60 * 1000;
    const T0: i64 = 1_700_000_000_000;

    async fn tx(pool: &SqlitePool, id: &str, email: Option<&str>, plate: Option<&str>, at: Option<i64>) {
        TransactionRepository::create(
            pool,
            CreateTransaction {
                id: id.to_string(),
                customer_email: email.map(str::to_string),
                vehicle_plate_number: plate.map(str::to_string),
                transaction_at: at,
            },
        )
        .await
        .unwrap();
    }

    async fn booking(
        pool: &SqlitePool,
        id: &str,
        email: Option<&str>,
        transaction_id: Option<&str>,
        plate: Option<&str>,
        scheduled: Option<i64>,
    ) {
        BookingRepository::create(
            pool,
            CreateBooking {
                id: id.to_string(),
                status: Some("completed".to_string()),
                scheduled_date_time: scheduled,
                user_email: email.map(str::to_string),
                transaction_id: transaction_id.map(str::to_string),
                plate_number: plate.map(str::to_string),
            },
        )
        .await
        .unwrap();
    }

    async fn email_of(pool: &SqlitePool, id: &str) -> Option<String> {
        TransactionRepository::find_by_id(pool, id)
            .await
            .unwrap()
            .unwrap()
            .customer_email
    }

    #[tokio::test]
    async fn links_by_transaction_id_first() {
        let pool = memory_pool().await;
        tx(&pool, "tx1", None, Some("ABC123"), Some(T0)).await;
        booking(&pool, "b1", Some("linked@x.com"), Some("tx1"), None, None).await;
        booking(&pool, "b2", Some("plate@x.com"), None, Some("ABC123"), Some(T0)).await;

        let summary = backfill_customer_emails(&pool).await.unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(email_of(&pool, "tx1").await.as_deref(), Some("linked@x.com"));
    }

    #[tokio::test]
    async fn falls_back_to_plate_within_a_day() {
        let pool = memory_pool().await;
        tx(&pool, "tx1", Some(""), Some("ABC123"), Some(T0)).await;
        // Linked booking without an email does not stop the plate lookup.
        booking(&pool, "b1", Some("  "), Some("tx1"), None, None).await;
        booking(&pool, "b2", Some("plate@x.com"), None, Some("ABC123"), Some(T0 + 23 * HOUR_MS)).await;

        let summary = backfill_customer_emails(&pool).await.unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(email_of(&pool, "tx1").await.as_deref(), Some("plate@x.com"));
    }

    #[tokio::test]
    async fn counts_every_bucket() {
        let pool = memory_pool().await;
        tx(&pool, "has-email", Some("kept@x.com"), None, None).await;
        tx(&pool, "far", None, Some("XYZ999"), Some(T0)).await;
        tx(&pool, "no-plate", None, None, Some(T0)).await;
        tx(&pool, "ok", None, Some("XYZ999"), Some(T0 + 72 * HOUR_MS)).await;
        booking(&pool, "b1", Some("far@x.com"), None, Some("XYZ999"), Some(T0 + 48 * HOUR_MS)).await;
        booking(&pool, "b2", Some("ok@x.com"), Some("ok"), None, None).await;

        let summary = backfill_customer_emails(&pool).await.unwrap();

        assert_eq!(
            summary,
            BackfillSummary {
                total: 4,
                missing: 3,
                updated: 1,
                no_booking: 2,
                failed: 0,
            }
        );
        assert_eq!(email_of(&pool, "has-email").await.as_deref(), Some("kept@x.com"));
        assert_eq!(email_of(&pool, "far").await, None);
    }
}
