//! Agreement submission: validate, persist, render and store the signed
//! document, then notify the owner.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use vendorsign_core::{document, AgreementSubmission, DocumentInput};
use vendorsign_db::NewAgreement;
use vendorsign_notify::EmailMessage;

use crate::middleware::RequestId;
use crate::storage::document_key;

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::{audit, document_input};

const DOCUMENT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Serialize)]
pub(in crate::api) struct SubmitResponse {
    pub agreement_id: Uuid,
    pub document_url: String,
}

/// First `X-Forwarded-For` hop, else `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// POST /api/v1/agreements: submit a signed agreement.
pub(in crate::api) async fn submit_agreement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<AgreementSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<SubmitResponse>>), ApiError> {
    let rid = &req_id.0;

    let submission = body.validate().map_err(|errors| {
        ApiError::new(rid, "validation_error", "agreement submission is invalid")
            .with_details(errors)
    })?;

    let ip_address = client_ip(&headers);
    let user_agent = user_agent(&headers);
    let row = vendorsign_db::create_agreement(
        &state.pool,
        &NewAgreement {
            submission: &submission,
            ip_address: ip_address.as_deref(),
            user_agent: user_agent.as_deref(),
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(
        agreement_id = row.id,
        agreement_type = %submission.agreement_type,
        partnership_level = %row.partnership_level,
        "agreement signed"
    );
    audit(
        &state.pool,
        row.id,
        "created",
        json!({
            "agreement_type": submission.agreement_type.as_str(),
            "partnership_level": row.partnership_level,
            "ip_address": ip_address,
        }),
    )
    .await;

    let input = document_input(&row, submission.agreement_type);
    let html = document::render_signed_html(&state.catalog, &input);
    let sha256 = format!("{:x}", Sha256::digest(html.as_bytes()));
    let key = document_key(row.id, &row.vendor_name, Utc::now().timestamp_millis());

    let stored = match state
        .store
        .put(&key, html.into_bytes(), DOCUMENT_CONTENT_TYPE)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!(agreement_id = row.id, key = %key, error = %e, "failed to store agreement document");
            audit(
                &state.pool,
                row.id,
                "document_failed",
                json!({ "error": e.to_string() }),
            )
            .await;
            return Err(ApiError::new(
                rid,
                "internal_error",
                "failed to store agreement document",
            ));
        }
    };

    vendorsign_db::attach_document(&state.pool, row.id, &stored.url, &stored.key, &sha256)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    audit(
        &state.pool,
        row.id,
        "document_stored",
        json!({ "key": stored.key, "sha256": sha256 }),
    )
    .await;

    notify_owner(&state, &input, &stored.url);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            rid,
            SubmitResponse {
                agreement_id: row.public_id,
                document_url: stored.url,
            },
        )),
    ))
}

/// Sends the "new agreement signed" notice in the background when an owner
/// address is configured.
fn notify_owner(state: &AppState, input: &DocumentInput, document_url: &str) {
    let Some(owner) = state.mail.owner_email.clone() else {
        return;
    };
    let notice = document::owner_notice(input);
    let message = EmailMessage {
        to: owner,
        subject: notice.subject.clone(),
        html: notice.html(),
        from: state.mail.from.clone(),
        reply_to: None,
        attachment_url: Some(document_url.to_owned()),
    };
    let notifier = state.notifier.clone();
    let agreement_id = input.agreement_id.clone();

    tokio::spawn(async move {
        let outcome = notifier.send(&message).await;
        if !outcome.delivered() {
            tracing::warn!(
                agreement_id = %agreement_id,
                failures = outcome.failures.len(),
                "owner notice not delivered"
            );
        }
    });
}
