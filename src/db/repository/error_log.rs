use chrono::Utc;
use sqlx::Row;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::*;
use crate::error::{AppError, AppResult};

// ============================================================================
// Error Log Repository
// ============================================================================

pub struct ErrorLogRepository;

impl ErrorLogRepository {
    pub async fn create(pool: &SqlitePool, log: CreateErrorLog) -> AppResult<ErrorLog> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let additional_data = log.additional_data.to_string();

        sqlx::query(
            r#"
            INSERT INTO error_logs (
                id, error, stack_trace, context, user_id, user_email, platform,
                fatal, additional_data, user_agent, ip, timestamp
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&log.error)
        .bind(&log.stack_trace)
        .bind(&log.context)
        .bind(&log.user_id)
        .bind(&log.user_email)
        .bind(&log.platform)
        .bind(log.fatal)
        .bind(&additional_data)
        .bind(&log.user_agent)
        .bind(&log.ip)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(ErrorLog {
            id,
            error: log.error,
            stack_trace: log.stack_trace,
            context: log.context,
            user_id: log.user_id,
            user_email: log.user_email,
            platform: log.platform,
            fatal: log.fatal,
            additional_data,
            user_agent: log.user_agent,
            ip: log.ip,
            timestamp: now,
        })
    }

    pub async fn find_latest(pool: &SqlitePool, limit: i64) -> AppResult<Vec<ErrorLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, error, stack_trace, context, user_id, user_email, platform,
                   fatal, additional_data, user_agent, ip, timestamp
            FROM error_logs
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ErrorLog {
                id: r.get("id"),
                error: r.get("error"),
                stack_trace: r.get("stack_trace"),
                context: r.get("context"),
                user_id: r.get("user_id"),
                user_email: r.get("user_email"),
                platform: r.get("platform"),
                fatal: r.get("fatal"),
                additional_data: r.get("additional_data"),
                user_agent: r.get("user_agent"),
                ip: r.get("ip"),
                timestamp: r.get("timestamp"),
            })
            .collect())
    }
}
