use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;

use crate::db::models::*;
use crate::error::{AppError, AppResult};

// ============================================================================
// Transaction Repository
// ============================================================================

pub struct TransactionRepository;

impl TransactionRepository {
    pub async fn find_all(pool: &SqlitePool) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_email, vehicle_plate_number, transaction_at, created_at, updated_at
            FROM transactions
            ORDER BY rowid
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows.iter().map(map_transaction).collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_email, vehicle_plate_number, transaction_at, created_at, updated_at
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(|r| map_transaction(&r)))
    }

    pub async fn update_customer_email(pool: &SqlitePool, id: &str, email: &str) -> AppResult<()> {
        let now = Utc::now().naive_utc();
        sqlx::query("UPDATE transactions SET customer_email = ?, updated_at = ? WHERE id = ?")
            .bind(email)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    pub async fn create(pool: &SqlitePool, tx: CreateTransaction) -> AppResult<Transaction> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, customer_email, vehicle_plate_number, transaction_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, customer_email, vehicle_plate_number, transaction_at, created_at, updated_at
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.customer_email)
        .bind(&tx.vehicle_plate_number)
        .bind(tx.transaction_at)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(map_transaction(&row))
    }
}

fn map_transaction(r: &SqliteRow) -> Transaction {
    Transaction {
        id: r.get("id"),
        customer_email: r.get("customer_email"),
        vehicle_plate_number: r.get("vehicle_plate_number"),
        transaction_at: r.get("transaction_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
