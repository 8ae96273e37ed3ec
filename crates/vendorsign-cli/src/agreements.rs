//! Agreement queries against the database.

use vendorsign_core::{delivery, Catalog};
use vendorsign_db::AgreementFilter;

/// Print agreements matching `filter` as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list(pool: &sqlx::PgPool, filter: &AgreementFilter) -> anyhow::Result<()> {
    let rows = vendorsign_db::list_agreements(pool, filter).await?;

    if rows.is_empty() {
        println!("no agreements found");
        return Ok(());
    }

    println!(
        "{:<38}{:<12}{:<11}{:<12}{:<12}VENDOR",
        "ID", "TYPE", "LEVEL", "STATUS", "SIGNED"
    );
    for row in &rows {
        let signed = row
            .signed_at
            .map_or_else(|| "\u{2014}".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let vendor = if row.vendor_name.chars().count() > 40 {
            format!("{}...", row.vendor_name.chars().take(40).collect::<String>())
        } else {
            row.vendor_name.clone()
        };
        println!(
            "{:<38}{:<12}{:<11}{:<12}{:<12}{}",
            row.public_id, row.agreement_type, row.partnership_level, row.status, signed, vendor
        );
    }

    Ok(())
}

/// Print the WhatsApp share link for one agreement.
///
/// # Errors
///
/// Returns an error if the agreement is unknown, has no stored document, or
/// the database query fails.
pub(crate) async fn run_whatsapp_link(
    pool: &sqlx::PgPool,
    catalog: &Catalog,
    id: uuid::Uuid,
) -> anyhow::Result<()> {
    let row = vendorsign_db::get_agreement(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("agreement '{id}' not found"))?;
    let document_url = row
        .document_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("agreement '{id}' has no stored document yet"))?;

    let label = &catalog.kind(row.agreement_type()?).label;
    let message = delivery::whatsapp_message(&row.vendor_name, label, document_url);
    println!("{}", delivery::whatsapp_link(row.whatsapp_number(), &message));

    Ok(())
}
