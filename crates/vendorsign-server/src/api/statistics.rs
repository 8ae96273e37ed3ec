use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use vendorsign_db::CountRow;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CountItem {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct RecentAgreementItem {
    pub agreement_id: Uuid,
    pub agreement_type: String,
    pub vendor_name: String,
    pub partnership_level: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct StatisticsData {
    pub total: i64,
    pub by_status: Vec<CountItem>,
    pub by_type: Vec<CountItem>,
    pub by_partnership: Vec<CountItem>,
    pub recent: Vec<RecentAgreementItem>,
}

fn counts(rows: Vec<CountRow>) -> Vec<CountItem> {
    rows.into_iter()
        .map(|r| CountItem {
            key: r.key,
            count: r.count,
        })
        .collect()
}

/// GET /api/v1/statistics: dashboard totals and the five newest agreements.
pub(super) async fn get_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatisticsData>>, ApiError> {
    let stats = vendorsign_db::agreement_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = StatisticsData {
        total: stats.total,
        by_status: counts(stats.by_status),
        by_type: counts(stats.by_type),
        by_partnership: counts(stats.by_partnership),
        recent: stats
            .recent
            .into_iter()
            .map(|r| RecentAgreementItem {
                agreement_id: r.public_id,
                agreement_type: r.agreement_type,
                vendor_name: r.vendor_name,
                partnership_level: r.partnership_level,
                status: r.status,
                created_at: r.created_at,
            })
            .collect(),
    };

    Ok(Json(ApiResponse::new(&req_id.0, data)))
}
