use sqlx::SqlitePool;

use crate::db::UserRepository;
use crate::error::AppResult;

/// Result of looking up the push token for a recipient email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Token(String),
    NoUserRecord,
    MissingToken,
}

/// Resolve the push-delivery token registered for `email`.
///
/// Uses the first user whose email matches exactly; a user without a
/// (non-empty) token resolves to `MissingToken`. Neither case is an error.
pub async fn resolve_token(pool: &SqlitePool, email: &str) -> AppResult<Resolution> {
    if email.is_empty() {
        return Ok(Resolution::NoUserRecord);
    }

    let user = match UserRepository::find_first_by_email(pool, email).await? {
        Some(u) => u,
        None => return Ok(Resolution::NoUserRecord),
    };

    Ok(match user.fcm_token {
        Some(token) if !token.is_empty() => Resolution::Token(token),
        _ => Resolution::MissingToken,
    })
}
