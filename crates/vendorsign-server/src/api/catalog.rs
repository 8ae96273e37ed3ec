//! Partnership catalog read before signing.
//!
//! - `GET /api/v1/catalog/{type}/levels`: partnership levels for a type
//! - `GET /api/v1/catalog/{type}/text?level=`: agreement text with terms filled

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vendorsign_core::{AgreementType, PartnershipLevel, PartnershipTerms};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct LevelsData {
    agreement_type: AgreementType,
    label: String,
    title: String,
    default_commission: String,
    levels: Vec<PartnershipLevel>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AgreementTextQuery {
    level: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AgreementTextData {
    agreement_type: AgreementType,
    terms: PartnershipTerms,
    text: String,
}

pub(super) fn parse_agreement_type(request_id: &str, raw: &str) -> Result<AgreementType, ApiError> {
    raw.parse::<AgreementType>().map_err(|_| {
        ApiError::new(
            request_id,
            "not_found",
            format!("unknown agreement type '{raw}'"),
        )
    })
}

pub(super) async fn list_levels(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_type): Path<String>,
) -> Result<Json<ApiResponse<LevelsData>>, ApiError> {
    let agreement_type = parse_agreement_type(&req_id.0, &agreement_type)?;
    let kind = state.catalog.kind(agreement_type);

    Ok(Json(ApiResponse::new(
        &req_id.0,
        LevelsData {
            agreement_type,
            label: kind.label.clone(),
            title: kind.title.clone(),
            default_commission: kind.default_commission.clone(),
            levels: kind.levels.clone(),
        },
    )))
}

/// Unknown or missing levels fall back to the type's default commission.
pub(super) async fn agreement_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_type): Path<String>,
    Query(query): Query<AgreementTextQuery>,
) -> Result<Json<ApiResponse<AgreementTextData>>, ApiError> {
    let agreement_type = parse_agreement_type(&req_id.0, &agreement_type)?;
    let level = query.level.unwrap_or_default();

    Ok(Json(ApiResponse::new(
        &req_id.0,
        AgreementTextData {
            agreement_type,
            terms: state.catalog.resolve_terms(agreement_type, &level),
            text: state.catalog.agreement_text(agreement_type, &level),
        },
    )))
}
