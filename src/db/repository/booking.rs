use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;

use crate::db::models::*;
use crate::error::{AppError, AppResult};

// ============================================================================
// Booking Repository
// ============================================================================

pub struct BookingRepository;

const BOOKING_COLUMNS: &str = "id, status, scheduled_date_time, user_email, transaction_id, \
                               plate_number, created_at, updated_at";

impl BookingRepository {
    pub async fn find_first_by_transaction_id(
        pool: &SqlitePool,
        transaction_id: &str,
    ) -> AppResult<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE transaction_id = ? ORDER BY rowid LIMIT 1",
            BOOKING_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(transaction_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.map(|r| map_booking(&r)))
    }

    /// Bookings for `plate_number` scheduled within `[from_ms, to_ms]` (inclusive).
    pub async fn find_by_plate_between(
        pool: &SqlitePool,
        plate_number: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings \
             WHERE plate_number = ? AND scheduled_date_time >= ? AND scheduled_date_time <= ? \
             ORDER BY rowid",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(plate_number)
            .bind(from_ms)
            .bind(to_ms)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.iter().map(map_booking).collect())
    }

    pub async fn create(pool: &SqlitePool, booking: CreateBooking) -> AppResult<Booking> {
        let now = Utc::now().naive_utc();
        let sql = format!(
            "INSERT INTO bookings (id, status, scheduled_date_time, user_email, transaction_id, \
             plate_number, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            BOOKING_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&booking.id)
            .bind(&booking.status)
            .bind(booking.scheduled_date_time)
            .bind(&booking.user_email)
            .bind(&booking.transaction_id)
            .bind(&booking.plate_number)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(map_booking(&row))
    }
}

fn map_booking(r: &SqliteRow) -> Booking {
    Booking {
        id: r.get("id"),
        status: r.get("status"),
        scheduled_date_time: r.get("scheduled_date_time"),
        user_email: r.get("user_email"),
        transaction_id: r.get("transaction_id"),
        plate_number: r.get("plate_number"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
