use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use vendorsign_core::{delivery, document, DeliveryMethod};
use vendorsign_notify::{EmailMessage, Mailbox};

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::{audit, not_found, require_document, resolve_agreement, AgreementItem};

#[derive(Debug, Serialize)]
pub(in crate::api) struct EmailDeliveryResponse {
    pub success: bool,
    pub message: &'static str,
    pub provider: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct WhatsAppLinkResponse {
    pub link: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct MarkDeliveredRequest {
    pub method: String,
}

/// POST /api/v1/agreements/{id}/email: send the download link to the vendor.
///
/// A chain where every provider fails is reported as `success: false`, not
/// as an HTTP error.
pub(in crate::api) async fn send_email(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_id): Path<String>,
) -> Result<Json<ApiResponse<EmailDeliveryResponse>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_agreement(&state.pool, &agreement_id, rid).await?;
    let document_url = require_document(&row, rid)?;
    let agreement_type = row
        .agreement_type()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let company = state.catalog.company();
    let message = EmailMessage {
        to: row.vendor_email.clone(),
        subject: document::agreement_email_subject(&state.catalog, agreement_type),
        html: document::render_agreement_email(
            &state.catalog,
            &row.vendor_name,
            agreement_type,
            document_url,
            Utc::now().year(),
        ),
        from: state.mail.from.clone(),
        reply_to: Some(Mailbox::named(&company.email, &company.name)),
        attachment_url: Some(document_url.to_owned()),
    };

    let outcome = state.notifier.send(&message).await;
    let failures: Vec<_> = outcome
        .failures
        .iter()
        .map(|f| json!({ "provider": f.provider, "error": f.error }))
        .collect();

    let Some(provider) = outcome.provider else {
        audit(
            &state.pool,
            row.id,
            "email_failed",
            json!({ "to": row.vendor_email, "failures": failures }),
        )
        .await;
        return Ok(Json(ApiResponse::new(
            rid,
            EmailDeliveryResponse {
                success: false,
                message: "Failed to send email",
                provider: None,
            },
        )));
    };

    vendorsign_db::mark_delivered(&state.pool, row.public_id, DeliveryMethod::Email)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    audit(
        &state.pool,
        row.id,
        "email_sent",
        json!({ "to": row.vendor_email, "provider": provider, "failures": failures }),
    )
    .await;

    Ok(Json(ApiResponse::new(
        rid,
        EmailDeliveryResponse {
            success: true,
            message: "Email sent successfully",
            provider: Some(provider),
        },
    )))
}

/// GET /api/v1/agreements/{id}/whatsapp-link: `wa.me` link to the vendor's
/// WhatsApp number, or their phone when none was given.
pub(in crate::api) async fn whatsapp_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_id): Path<String>,
) -> Result<Json<ApiResponse<WhatsAppLinkResponse>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_agreement(&state.pool, &agreement_id, rid).await?;
    let document_url = require_document(&row, rid)?;
    let agreement_type = row
        .agreement_type()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let label = &state.catalog.kind(agreement_type).label;
    let message = delivery::whatsapp_message(&row.vendor_name, label, document_url);
    let phone = row.whatsapp_number();

    Ok(Json(ApiResponse::new(
        rid,
        WhatsAppLinkResponse {
            link: delivery::whatsapp_link(phone, &message),
            phone: delivery::clean_phone(phone),
        },
    )))
}

/// POST /api/v1/agreements/{id}/delivered: record a delivery made outside
/// the service.
pub(in crate::api) async fn mark_delivered(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(agreement_id): Path<String>,
    Json(body): Json<MarkDeliveredRequest>,
) -> Result<Json<ApiResponse<AgreementItem>>, ApiError> {
    let rid = &req_id.0;
    let method = body.method.trim().parse::<DeliveryMethod>().map_err(|_| {
        ApiError::new(
            rid,
            "validation_error",
            format!(
                "method must be 'email' or 'whatsapp', got '{}'",
                body.method
            ),
        )
    })?;
    let public_id = super::parse_agreement_id(rid, &agreement_id)?;

    let row = vendorsign_db::mark_delivered(&state.pool, public_id, method)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| not_found(rid, &agreement_id))?;
    audit(
        &state.pool,
        row.id,
        "marked_delivered",
        json!({ "method": method.as_str() }),
    )
    .await;

    Ok(Json(ApiResponse::new(rid, AgreementItem::from_row(row, rid)?)))
}
