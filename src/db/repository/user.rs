use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;

use crate::db::models::*;
use crate::error::{AppError, AppResult};

// ============================================================================
// User Repository
// ============================================================================

pub struct UserRepository;

impl UserRepository {
    /// Exact-match lookup on `email`, limited to one row.
    ///
    /// Emails are not unique in the collection; when several users share one,
    /// the first in insertion order wins.
    pub async fn find_first_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, fcm_token, created_at, updated_at
            FROM users
            WHERE email = ?
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(|r| map_user(&r)))
    }

    pub async fn upsert(pool: &SqlitePool, user: UpsertUser) -> AppResult<User> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, fcm_token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                fcm_token = excluded.fcm_token,
                updated_at = excluded.updated_at
            RETURNING id, email, fcm_token, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.fcm_token)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(map_user(&row))
    }
}

fn map_user(r: &SqliteRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        fcm_token: r.get("fcm_token"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
