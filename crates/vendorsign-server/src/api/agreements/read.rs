use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vendorsign_core::{AgreementStatus, AgreementType};
use vendorsign_db::AgreementFilter;

use crate::middleware::RequestId;

use super::super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};
use super::{resolve_agreement, AgreementItem};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AgreementListQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub agreement_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct AgreementEventItem {
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

fn parse_filter<T: std::str::FromStr>(
    request_id: &str,
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>().map_err(|_| {
                ApiError::new(
                    request_id,
                    "validation_error",
                    format!("unknown {field} '{s}'"),
                )
            })
        })
        .transpose()
}

/// GET /api/v1/agreements/{id}
pub(in crate::api) async fn get_agreement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_id): Path<String>,
) -> Result<Json<ApiResponse<AgreementItem>>, ApiError> {
    let row = resolve_agreement(&state.pool, &agreement_id, &req_id.0).await?;
    let item = AgreementItem::from_row(row, &req_id.0)?;
    Ok(Json(ApiResponse::new(&req_id.0, item)))
}

/// GET /api/v1/agreements: newest first, filtered by status, type and a
/// case-insensitive search over name, e-mail and phone.
pub(in crate::api) async fn list_agreements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AgreementListQuery>,
) -> Result<Json<ApiResponse<Vec<AgreementItem>>>, ApiError> {
    let rid = &req_id.0;
    let filter = AgreementFilter {
        status: parse_filter::<AgreementStatus>(rid, "status", params.status.as_deref())?,
        agreement_type: parse_filter::<AgreementType>(
            rid,
            "agreement type",
            params.agreement_type.as_deref(),
        )?,
        search: params.search,
        limit: Some(normalize_limit(params.limit)),
    };

    let rows = vendorsign_db::list_agreements(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let items = rows
        .into_iter()
        .map(|row| AgreementItem::from_row(row, rid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::new(rid, items)))
}

/// GET /api/v1/agreements/{id}/events: audit trail, oldest first.
pub(in crate::api) async fn list_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AgreementEventItem>>>, ApiError> {
    let row = resolve_agreement(&state.pool, &agreement_id, &req_id.0).await?;
    let events = vendorsign_db::list_events(&state.pool, row.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = events
        .into_iter()
        .map(|e| AgreementEventItem {
            action: e.action,
            details: e.details,
            created_at: e.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(&req_id.0, items)))
}
