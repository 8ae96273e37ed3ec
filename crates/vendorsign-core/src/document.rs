//! Content built from a signed agreement: the filled legal text, the
//! print-ready signed HTML document, the vendor e-mail and the owner notice.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::agreement::AgreementType;
use crate::catalog::Catalog;
use crate::template;

/// The vendor side of an agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParty {
    pub name: String,
    pub address: String,
    pub registration_no: Option<String>,
    pub email: String,
    pub phone: String,
    pub contact_person_name: String,
    pub contact_person_title: Option<String>,
}

/// Everything needed to render a signed agreement.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub agreement_id: String,
    pub agreement_type: AgreementType,
    pub party: DocumentParty,
    pub partnership_level: String,
    /// Data URL of the vendor's drawn signature.
    pub vendor_signature: Option<String>,
    pub effective_date: NaiveDate,
    pub signed_on: NaiveDate,
    pub generated_on: NaiveDate,
}

/// Subject and plain-text body of the "new agreement signed" notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerNotice {
    pub subject: String,
    pub body: String,
}

impl OwnerNotice {
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            "<p>{}</p>",
            escape_html(&self.body).replace('\n', "<br>")
        )
    }
}

/// `October 19, 2026`
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// The agreement template with the record's values substituted.
#[must_use]
pub fn fill_agreement(catalog: &Catalog, input: &DocumentInput) -> String {
    let terms = catalog.resolve_terms(input.agreement_type, &input.partnership_level);
    let values = HashMap::from([
        (template::EFFECTIVE_DATE, format_long_date(input.effective_date)),
        (template::VENDOR_NAME, input.party.name.clone()),
        (template::VENDOR_ADDRESS, input.party.address.clone()),
        (
            template::VENDOR_REGISTRATION,
            input.party.registration_no.clone().unwrap_or_default(),
        ),
        (template::COMMISSION_RATE, terms.commission),
        (template::PARTNERSHIP_LEVEL, terms.name),
    ]);
    template::substitute(catalog.template(input.agreement_type), &values)
}

const DOCUMENT_STYLES: &str = r"
    @page { size: A4; margin: 2cm; }
    * { box-sizing: border-box; }
    body {
      font-family: 'Times New Roman', Times, serif;
      font-size: 14pt;
      line-height: 1.8;
      color: #1a1a1a;
      max-width: 210mm;
      margin: 0 auto;
      padding: 20px;
      background: white;
    }
    .header { text-align: center; border-bottom: 2px solid #1a365d; padding-bottom: 20px; margin-bottom: 30px; }
    .logo { font-size: 28pt; font-weight: bold; color: #1a365d; letter-spacing: 2px; }
    .company-info { font-size: 9pt; color: #666; margin-top: 5px; }
    .agreement-title { font-size: 16pt; font-weight: bold; text-align: center; color: #1a365d; margin: 30px 0 20px 0; text-transform: uppercase; }
    .agreement-subtitle { font-size: 12pt; text-align: center; color: #444; margin-bottom: 30px; }
    .section-title { font-size: 14pt; font-weight: bold; color: #1a365d; margin-bottom: 10px; border-bottom: 1px solid #ddd; padding-bottom: 5px; }
    .content { text-align: justify; font-size: 14pt; line-height: 1.8; letter-spacing: 0.3px; }
    .parties-box { background: #f8f9fa; border: 1px solid #ddd; padding: 20px; margin: 20px 0; border-radius: 5px; }
    .party { margin-bottom: 15px; }
    .party-title { font-weight: bold; color: #1a365d; margin-bottom: 5px; }
    .signature-section { margin-top: 50px; page-break-inside: avoid; }
    .signatures-container { display: flex; justify-content: space-between; gap: 40px; margin-top: 30px; }
    .signature-box { flex: 1; border: 1px solid #ddd; padding: 20px; min-height: 200px; }
    .signature-box-title { font-weight: bold; color: #1a365d; margin-bottom: 15px; font-size: 11pt; }
    .signature-image { height: 60px; margin: 10px 0; }
    .signature-line { border-bottom: 1px solid #333; height: 60px; margin: 10px 0; }
    .signature-label { font-size: 9pt; color: #666; margin-top: 5px; }
    .stamp-container { text-align: center; margin-top: 20px; }
    .footer { margin-top: 50px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 9pt; color: #666; text-align: center; }
    @media print { body { padding: 0; } }
";

/// Self-contained, print-ready HTML for a signed agreement.
///
/// Vendor-supplied values are HTML-escaped; the counter-signature and stamp
/// SVGs come from the catalog verbatim.
#[must_use]
pub fn render_signed_html(catalog: &Catalog, input: &DocumentInput) -> String {
    let company = catalog.company();
    let kind = catalog.kind(input.agreement_type);
    let terms = catalog.resolve_terms(input.agreement_type, &input.partnership_level);
    let party = &input.party;

    let vendor_name = escape_html(&party.name);
    let contact_name = escape_html(&party.contact_person_name);
    let contact_title = party.contact_person_title.as_deref().map(escape_html);
    let registration = party
        .registration_no
        .as_deref()
        .map_or_else(|| template::MISSING_VALUE.to_string(), escape_html);
    let effective_date = format_long_date(input.effective_date);
    let signed_on = format_long_date(input.signed_on);
    let filled = escape_html(&fill_agreement(catalog, input)).replace('\n', "<br>\n");

    let mut html = String::with_capacity(filled.len() + 16 * 1024);
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{trade} Vendor Agreement - {vendor_name}</title>
  <style>{DOCUMENT_STYLES}</style>
</head>
<body>
  <div class="header">
    <div class="logo">{trade}</div>
    <div class="company-info">
      {company_name} | {company_address}<br>
      Email: {company_email}
    </div>
  </div>

  <div class="agreement-title">{title}</div>
  <div class="agreement-subtitle">{level_name} - Commission Rate: {commission}</div>
"#,
        trade = escape_html(&company.trade_name),
        company_name = escape_html(&company.name),
        company_address = escape_html(&company.address),
        company_email = escape_html(&company.email),
        title = escape_html(&kind.title),
        level_name = escape_html(&terms.name),
        commission = escape_html(&terms.commission),
    );

    let contact_line = match &contact_title {
        Some(title) => format!("{contact_name}, {title}"),
        None => contact_name.clone(),
    };
    let _ = write!(
        html,
        r#"
  <div class="parties-box">
    <div class="party">
      <div class="party-title">THE VENDOR:</div>
      <div><strong>Name:</strong> {vendor_name}</div>
      <div><strong>Address:</strong> {address}</div>
      <div><strong>Registration No:</strong> {registration}</div>
      <div><strong>Email:</strong> {email}</div>
      <div><strong>Phone:</strong> {phone}</div>
      <div><strong>Contact Person:</strong> {contact_line}</div>
    </div>
    <div class="party">
      <div class="party-title">THE APP:</div>
      <div><strong>Name:</strong> {trade}</div>
      <div><strong>Company:</strong> {company_name}</div>
      <div><strong>Address:</strong> {company_address}</div>
      <div><strong>Email:</strong> {company_email}</div>
    </div>
    <div><strong>Effective Date:</strong> {effective_date}</div>
  </div>

  <div class="content">{filled}</div>
"#,
        address = escape_html(&party.address),
        email = escape_html(&party.email),
        phone = escape_html(&party.phone),
        trade = escape_html(&company.trade_name),
        company_name = escape_html(&company.name),
        company_address = escape_html(&company.address),
        company_email = escape_html(&company.email),
    );

    let title_block = contact_title
        .as_ref()
        .map(|t| {
            format!(
                "\n        <div class=\"signature-label\">Title:</div>\n        <div><strong>{t}</strong></div>"
            )
        })
        .unwrap_or_default();
    let vendor_signature = match input.vendor_signature.as_deref() {
        Some(src) if !src.trim().is_empty() => format!(
            r#"<div class="signature-image"><img src="{}" alt="Vendor Signature" style="max-height: 60px; max-width: 200px;"></div>"#,
            escape_html(src)
        ),
        _ => r#"<div class="signature-line"></div>"#.to_string(),
    };
    let _ = write!(
        html,
        r#"
  <div class="signature-section">
    <div class="section-title">SIGNATURES</div>
    <div class="signatures-container">
      <div class="signature-box">
        <div class="signature-box-title">THE VENDOR</div>
        <div class="signature-label">Business Name:</div>
        <div><strong>{vendor_name}</strong></div>
        <div class="signature-label">Signatory Name:</div>
        <div><strong>{contact_name}</strong></div>{title_block}
        <div class="signature-label">Signature:</div>
        {vendor_signature}
        <div class="signature-label">Date:</div>
        <div><strong>{signed_on}</strong></div>
      </div>
      <div class="signature-box">
        <div class="signature-box-title">THE APP - {company_name}</div>
        <div class="signature-label">Name:</div>
        <div><strong>{representative}</strong></div>
        <div class="signature-label">Title:</div>
        <div><strong>{representative_title}</strong></div>
        <div class="signature-label">Signature:</div>
        <div class="signature-image">{countersignature}</div>
        <div class="signature-label">Date:</div>
        <div><strong>{signed_on}</strong></div>
        <div class="stamp-container">{stamp}</div>
      </div>
    </div>
  </div>

  <div class="footer">
    <p>This agreement was generated and signed digitally via the {trade} Vendor Onboarding System.</p>
    <p>Agreement ID: {agreement_id} | Generated on: {generated_on}</p>
    <p>{company_name} | {company_address} | {company_email}</p>
  </div>
</body>
</html>
"#,
        company_name = escape_html(&company.name),
        company_address = escape_html(&company.address),
        company_email = escape_html(&company.email),
        representative = escape_html(&company.representative),
        representative_title = escape_html(&company.representative_title),
        countersignature = catalog.countersignature_svg().trim(),
        stamp = catalog.stamp_svg().trim(),
        trade = escape_html(&company.trade_name),
        agreement_id = escape_html(&input.agreement_id),
        generated_on = format_long_date(input.generated_on),
    );
    html
}

/// `Your ZNZNOW Tours & Activities Vendor Agreement`
#[must_use]
pub fn agreement_email_subject(catalog: &Catalog, agreement_type: AgreementType) -> String {
    format!(
        "Your {} {} Vendor Agreement",
        catalog.company().trade_name,
        catalog.kind(agreement_type).label
    )
}

/// HTML e-mail sent to the vendor with a download link for the document.
#[must_use]
pub fn render_agreement_email(
    catalog: &Catalog,
    vendor_name: &str,
    agreement_type: AgreementType,
    download_url: &str,
    year: i32,
) -> String {
    let company = catalog.company();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Your {trade} Vendor Agreement</title>
</head>
<body style="margin: 0; padding: 0; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f5f5f5;">
  <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f5f5f5; padding: 40px 20px;">
    <tr><td align="center">
      <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
        <tr>
          <td style="background-color: #1a365d; padding: 30px; text-align: center;">
            <h1 style="color: #ffffff; margin: 0; font-size: 28px; letter-spacing: 2px;">{trade}</h1>
            <p style="color: #a0aec0; margin: 10px 0 0 0; font-size: 14px;">Vendor Partnership Agreement</p>
          </td>
        </tr>
        <tr>
          <td style="padding: 40px 30px;">
            <h2 style="color: #1a365d; margin: 0 0 20px 0; font-size: 22px;">Dear {vendor},</h2>
            <p style="color: #4a5568; line-height: 1.6;">
              Thank you for signing your <strong>{label} Vendor Partnership Agreement</strong> with {trade}.
              We are excited to welcome you as a partner!
            </p>
            <p style="color: #4a5568; line-height: 1.6;">
              Your signed agreement is now complete and ready for your records. Please download and save a copy for your files.
            </p>
            <p style="text-align: center; margin: 30px 0;">
              <a href="{url}" style="display: inline-block; background-color: #1a365d; color: #ffffff; text-decoration: none; padding: 14px 30px; border-radius: 6px; font-weight: bold; font-size: 16px;">Download Your Agreement</a>
            </p>
            <p style="color: #4a5568; line-height: 1.6;"><strong>What happens next?</strong></p>
            <ul style="color: #4a5568; line-height: 1.8; padding-left: 20px;">
              <li>Our team will review your agreement and activate your vendor account</li>
              <li>You will receive onboarding instructions within 24-48 hours</li>
              <li>You can start listing your services on the {trade} platform</li>
            </ul>
            <p style="color: #4a5568; line-height: 1.6; margin: 0;">
              If you have any questions, please contact us at
              <a href="mailto:{email}" style="color: #1a365d;">{email}</a>.
            </p>
          </td>
        </tr>
        <tr>
          <td style="background-color: #f7fafc; padding: 30px; text-align: center; border-top: 1px solid #e2e8f0;">
            <p style="color: #718096; margin: 0 0 10px 0; font-size: 14px;"><strong>{company_name}</strong> (Trading as {trade})</p>
            <p style="color: #a0aec0; margin: 0; font-size: 12px;">{address}</p>
            <p style="color: #a0aec0; margin: 5px 0 0 0; font-size: 12px;">&copy; {year} {company_name}. All rights reserved.</p>
          </td>
        </tr>
      </table>
    </td></tr>
  </table>
</body>
</html>
"#,
        trade = escape_html(&company.trade_name),
        vendor = escape_html(vendor_name),
        label = escape_html(&catalog.kind(agreement_type).label),
        url = escape_html(download_url),
        email = escape_html(&company.email),
        company_name = escape_html(&company.name),
        address = escape_html(&company.address),
    )
}

/// Notice for the business owner that a vendor has signed.
#[must_use]
pub fn owner_notice(input: &DocumentInput) -> OwnerNotice {
    OwnerNotice {
        subject: format!("New Vendor Agreement Signed: {}", input.party.name),
        body: format!(
            "A new {} vendor agreement has been signed.\n\n\
             Vendor: {}\n\
             Partnership Level: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Agreement ID: {}",
            input.agreement_type,
            input.party.name,
            input.partnership_level,
            input.party.email,
            input.party.phone,
            input.agreement_id,
        ),
    }
}
