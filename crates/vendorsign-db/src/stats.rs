//! Aggregate counts over the `agreements` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RECENT_LIMIT: i64 = 5;

/// One bucket of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CountRow {
    pub key: String,
    pub count: i64,
}

/// Lightweight agreement projection for dashboards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgreementSummaryRow {
    pub public_id: Uuid,
    pub agreement_type: String,
    pub vendor_name: String,
    pub partnership_level: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AgreementStats {
    pub total: i64,
    pub by_status: Vec<CountRow>,
    pub by_type: Vec<CountRow>,
    pub by_partnership: Vec<CountRow>,
    pub recent: Vec<AgreementSummaryRow>,
}

/// Totals, per-status/type/level counts and the five newest agreements.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn agreement_stats(pool: &PgPool) -> Result<AgreementStats, DbError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM agreements")
        .fetch_one(pool)
        .await?;

    let by_status = grouped_count(pool, "status").await?;
    let by_type = grouped_count(pool, "agreement_type").await?;
    let by_partnership = grouped_count(pool, "partnership_level").await?;

    let recent = sqlx::query_as::<_, AgreementSummaryRow>(
        "SELECT public_id, agreement_type, vendor_name, partnership_level, status, created_at \
         FROM agreements \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(RECENT_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(AgreementStats {
        total,
        by_status,
        by_type,
        by_partnership,
        recent,
    })
}

/// `column` is always one of the fixed names above, never user input.
async fn grouped_count(pool: &PgPool, column: &'static str) -> Result<Vec<CountRow>, DbError> {
    let sql = format!(
        "SELECT {column} AS key, COUNT(*) AS count \
         FROM agreements \
         GROUP BY {column} \
         ORDER BY {column}"
    );
    let rows = sqlx::query_as::<_, CountRow>(&sql).fetch_all(pool).await?;
    Ok(rows)
}
