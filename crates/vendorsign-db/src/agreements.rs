//! Database operations for the `agreements` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vendorsign_core::{AgreementStatus, AgreementType, DeliveryMethod, ValidatedSubmission};

use crate::DbError;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

const AGREEMENT_COLUMNS: &str = "id, public_id, agreement_type, vendor_name, vendor_address, \
     vendor_registration_no, vendor_email, vendor_phone, vendor_whatsapp, contact_person_name, \
     contact_person_title, partnership_level, vendor_signature, signed_at, status, document_url, \
     document_key, document_sha256, email_sent, email_sent_at, whatsapp_sent, whatsapp_sent_at, \
     effective_date, ip_address, user_agent, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `agreements` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgreementRow {
    pub id: i64,
    pub public_id: Uuid,
    pub agreement_type: String,
    pub vendor_name: String,
    pub vendor_address: String,
    pub vendor_registration_no: Option<String>,
    pub vendor_email: String,
    pub vendor_phone: String,
    pub vendor_whatsapp: Option<String>,
    pub contact_person_name: String,
    pub contact_person_title: Option<String>,
    pub partnership_level: String,
    pub vendor_signature: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub document_url: Option<String>,
    pub document_key: Option<String>,
    pub document_sha256: Option<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub whatsapp_sent: bool,
    pub whatsapp_sent_at: Option<DateTime<Utc>>,
    pub effective_date: Option<NaiveDate>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgreementRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored type is unknown.
    pub fn agreement_type(&self) -> Result<AgreementType, DbError> {
        self.agreement_type
            .parse()
            .map_err(|_| DbError::InvalidValue {
                kind: "agreement type",
                value: self.agreement_type.clone(),
            })
    }

    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored status is unknown.
    pub fn status(&self) -> Result<AgreementStatus, DbError> {
        self.status.parse().map_err(|_| DbError::InvalidValue {
            kind: "agreement status",
            value: self.status.clone(),
        })
    }

    /// Number to use for WhatsApp delivery: the dedicated WhatsApp number when
    /// present, otherwise the phone number.
    #[must_use]
    pub fn whatsapp_number(&self) -> &str {
        self.vendor_whatsapp
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.vendor_phone)
    }
}

/// Input for [`create_agreement`].
#[derive(Debug, Clone, Copy)]
pub struct NewAgreement<'a> {
    pub submission: &'a ValidatedSubmission,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Filters for [`list_agreements`]. `search` matches vendor name, e-mail or
/// phone, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AgreementFilter {
    pub status: Option<AgreementStatus>,
    pub agreement_type: Option<AgreementType>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a signed agreement and returns the stored row.
///
/// The row starts in status `signed` with `signed_at = NOW()`; the effective
/// date defaults to the signing date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_agreement(
    pool: &PgPool,
    new: &NewAgreement<'_>,
) -> Result<AgreementRow, DbError> {
    let s = new.submission;
    let sql = format!(
        "INSERT INTO agreements (agreement_type, vendor_name, vendor_address, \
             vendor_registration_no, vendor_email, vendor_phone, vendor_whatsapp, \
             contact_person_name, contact_person_title, partnership_level, vendor_signature, \
             signed_at, status, effective_date, ip_address, user_agent) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), 'signed', \
             COALESCE($12, CURRENT_DATE), $13, $14) \
         RETURNING {AGREEMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AgreementRow>(&sql)
        .bind(s.agreement_type.as_str())
        .bind(&s.vendor_name)
        .bind(&s.vendor_address)
        .bind(s.vendor_registration_no.as_deref())
        .bind(&s.vendor_email)
        .bind(&s.vendor_phone)
        .bind(s.vendor_whatsapp.as_deref())
        .bind(&s.contact_person_name)
        .bind(s.contact_person_title.as_deref())
        .bind(&s.partnership_level)
        .bind(s.vendor_signature.as_str())
        .bind(s.effective_date)
        .bind(new.ip_address)
        .bind(new.user_agent)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Returns one agreement by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_agreement(pool: &PgPool, public_id: Uuid) -> Result<Option<AgreementRow>, DbError> {
    let sql = format!("SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE public_id = $1");
    let row = sqlx::query_as::<_, AgreementRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Lists agreements matching `filter`, newest first.
///
/// The limit defaults to [`DEFAULT_LIST_LIMIT`] and is clamped to
/// `1..=MAX_LIST_LIMIT`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_agreements(
    pool: &PgPool,
    filter: &AgreementFilter,
) -> Result<Vec<AgreementRow>, DbError> {
    let limit = filter
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)));

    let sql = format!(
        "SELECT {AGREEMENT_COLUMNS} FROM agreements \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::text IS NULL OR agreement_type = $2) \
           AND ($3::text IS NULL \
                OR vendor_name ILIKE $3 \
                OR vendor_email ILIKE $3 \
                OR vendor_phone ILIKE $3) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $4"
    );
    let rows = sqlx::query_as::<_, AgreementRow>(&sql)
        .bind(filter.status.map(AgreementStatus::as_str))
        .bind(filter.agreement_type.map(AgreementType::as_str))
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Records where the rendered document was stored.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no agreement has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn attach_document(
    pool: &PgPool,
    id: i64,
    url: &str,
    key: &str,
    sha256: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE agreements \
         SET document_url = $1, document_key = $2, document_sha256 = $3, updated_at = NOW() \
         WHERE id = $4",
    )
    .bind(url)
    .bind(key)
    .bind(sha256)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Marks an agreement as delivered over `method` and returns the updated row.
///
/// Idempotent: the first delivery timestamp for a channel is kept. Returns
/// `None` when no agreement has `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_delivered(
    pool: &PgPool,
    public_id: Uuid,
    method: DeliveryMethod,
) -> Result<Option<AgreementRow>, DbError> {
    let set_channel = match method {
        DeliveryMethod::Email => {
            "email_sent = TRUE, email_sent_at = COALESCE(email_sent_at, NOW())"
        }
        DeliveryMethod::Whatsapp => {
            "whatsapp_sent = TRUE, whatsapp_sent_at = COALESCE(whatsapp_sent_at, NOW())"
        }
    };
    let sql = format!(
        "UPDATE agreements \
         SET {set_channel}, status = 'delivered', updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {AGREEMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AgreementRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
