pub mod booking;
pub mod error_log;
pub mod transaction;
pub mod user;

pub use booking::BookingRepository;
pub use error_log::ErrorLogRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;

#[cfg(test)]
pub(crate) mod test_pool {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;

    /// A single-connection in-memory database with migrations applied. One
    /// connection keeps every query on the same in-memory database.
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}
