//! Agreement API handlers.
//!
//! - `POST /api/v1/agreements`: submit a signed agreement
//! - `GET  /api/v1/agreements/{id}`: one agreement
//! - `POST /api/v1/agreements/{id}/email`: e-mail the document to the vendor
//! - `GET  /api/v1/agreements/{id}/whatsapp-link`: WhatsApp share link
//! - `GET  /api/v1/agreements`: filtered list (admin)
//! - `POST /api/v1/agreements/{id}/delivered`: record a delivery (admin)
//! - `GET  /api/v1/agreements/{id}/events`: audit trail (admin)

mod delivery;
mod read;
mod submit;

pub(super) use delivery::{mark_delivered, send_email, whatsapp_link};
pub(super) use read::{get_agreement, list_agreements, list_events};
pub(super) use submit::submit_agreement;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use vendorsign_core::{AgreementStatus, AgreementType, DocumentInput, DocumentParty};
use vendorsign_db::AgreementRow;

use super::{map_db_error, ApiError};

#[derive(Debug, Serialize)]
pub(in crate::api) struct AgreementItem {
    pub agreement_id: Uuid,
    pub agreement_type: AgreementType,
    pub vendor_name: String,
    pub vendor_address: String,
    pub vendor_registration_no: Option<String>,
    pub vendor_email: String,
    pub vendor_phone: String,
    pub vendor_whatsapp: Option<String>,
    pub contact_person_name: String,
    pub contact_person_title: Option<String>,
    pub partnership_level: String,
    pub status: AgreementStatus,
    pub signed_at: Option<DateTime<Utc>>,
    pub effective_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub whatsapp_sent: bool,
    pub whatsapp_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AgreementItem {
    fn from_row(row: AgreementRow, request_id: &str) -> Result<Self, ApiError> {
        let agreement_type = row
            .agreement_type()
            .map_err(|e| map_db_error(request_id.to_owned(), &e))?;
        let status = row
            .status()
            .map_err(|e| map_db_error(request_id.to_owned(), &e))?;

        Ok(Self {
            agreement_id: row.public_id,
            agreement_type,
            vendor_name: row.vendor_name,
            vendor_address: row.vendor_address,
            vendor_registration_no: row.vendor_registration_no,
            vendor_email: row.vendor_email,
            vendor_phone: row.vendor_phone,
            vendor_whatsapp: row.vendor_whatsapp,
            contact_person_name: row.contact_person_name,
            contact_person_title: row.contact_person_title,
            partnership_level: row.partnership_level,
            status,
            signed_at: row.signed_at,
            effective_date: row.effective_date,
            document_url: row.document_url,
            email_sent: row.email_sent,
            email_sent_at: row.email_sent_at,
            whatsapp_sent: row.whatsapp_sent,
            whatsapp_sent_at: row.whatsapp_sent_at,
            created_at: row.created_at,
        })
    }
}

/// Malformed ids are reported the same way as unknown ones.
fn parse_agreement_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found(request_id, raw))
}

fn not_found(request_id: &str, raw: &str) -> ApiError {
    ApiError::new(request_id, "not_found", format!("agreement '{raw}' not found"))
}

/// Resolve a path id to an `AgreementRow`, returning 404 if not found.
async fn resolve_agreement(
    pool: &PgPool,
    raw_id: &str,
    request_id: &str,
) -> Result<AgreementRow, ApiError> {
    let public_id = parse_agreement_id(request_id, raw_id)?;
    vendorsign_db::get_agreement(pool, public_id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| not_found(request_id, raw_id))
}

/// The stored document URL, or 409 while none has been generated.
fn require_document<'a>(row: &'a AgreementRow, request_id: &str) -> Result<&'a str, ApiError> {
    row.document_url.as_deref().ok_or_else(|| {
        ApiError::new(
            request_id,
            "conflict",
            "agreement document has not been generated yet",
        )
    })
}

/// Appends an audit event; failures are logged and otherwise ignored.
async fn audit(pool: &PgPool, agreement_id: i64, action: &str, details: serde_json::Value) {
    if let Err(e) = vendorsign_db::record_event(pool, agreement_id, action, &details).await {
        tracing::warn!(agreement_id, action, error = %e, "failed to record agreement event");
    }
}

/// Document content for a stored agreement.
fn document_input(row: &AgreementRow, agreement_type: AgreementType) -> DocumentInput {
    let signed_on = row.signed_at.unwrap_or(row.created_at).date_naive();
    DocumentInput {
        agreement_id: row.public_id.to_string(),
        agreement_type,
        party: DocumentParty {
            name: row.vendor_name.clone(),
            address: row.vendor_address.clone(),
            registration_no: row.vendor_registration_no.clone(),
            email: row.vendor_email.clone(),
            phone: row.vendor_phone.clone(),
            contact_person_name: row.contact_person_name.clone(),
            contact_person_title: row.contact_person_title.clone(),
        },
        partnership_level: row.partnership_level.clone(),
        vendor_signature: row.vendor_signature.clone(),
        effective_date: row.effective_date.unwrap_or(signed_on),
        signed_on,
        generated_on: Utc::now().date_naive(),
    }
}
