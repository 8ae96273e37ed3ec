//! Audit trail for agreements (`agreement_events` table).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `agreement_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgreementEventRow {
    pub id: i64,
    pub agreement_id: i64,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Appends an event for `agreement_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown
/// agreement id).
pub async fn record_event(
    pool: &PgPool,
    agreement_id: i64,
    action: &str,
    details: &serde_json::Value,
) -> Result<AgreementEventRow, DbError> {
    let row = sqlx::query_as::<_, AgreementEventRow>(
        "INSERT INTO agreement_events (agreement_id, action, details) \
         VALUES ($1, $2, $3) \
         RETURNING id, agreement_id, action, details, created_at",
    )
    .bind(agreement_id)
    .bind(action)
    .bind(details)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Events for one agreement, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_events(
    pool: &PgPool,
    agreement_id: i64,
) -> Result<Vec<AgreementEventRow>, DbError> {
    let rows = sqlx::query_as::<_, AgreementEventRow>(
        "SELECT id, agreement_id, action, details, created_at \
         FROM agreement_events \
         WHERE agreement_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(agreement_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
