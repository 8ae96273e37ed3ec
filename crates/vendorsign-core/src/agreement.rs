//! Agreement vocabulary shared by the API, the repository and the CLI, plus
//! validation of the vendor submission form.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signature::SignatureData;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementType {
    Tours,
    Restaurant,
}

impl AgreementType {
    pub const ALL: [AgreementType; 2] = [AgreementType::Tours, AgreementType::Restaurant];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AgreementType::Tours => "tours",
            AgreementType::Restaurant => "restaurant",
        }
    }
}

impl std::fmt::Display for AgreementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgreementType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tours" => Ok(AgreementType::Tours),
            "restaurant" => Ok(AgreementType::Restaurant),
            other => Err(ParseEnumError {
                kind: "agreement type",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a stored agreement. Submissions are created as `Signed`; the
/// only later transition is to `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Draft,
    Pending,
    Signed,
    Delivered,
}

impl AgreementStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AgreementStatus::Draft => "draft",
            AgreementStatus::Pending => "pending",
            AgreementStatus::Signed => "signed",
            AgreementStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgreementStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AgreementStatus::Draft),
            "pending" => Ok(AgreementStatus::Pending),
            "signed" => Ok(AgreementStatus::Signed),
            "delivered" => Ok(AgreementStatus::Delivered),
            other => Err(ParseEnumError {
                kind: "agreement status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Email,
    Whatsapp,
}

impl DeliveryMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMethod::Email => "email",
            DeliveryMethod::Whatsapp => "whatsapp",
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(DeliveryMethod::Email),
            "whatsapp" => Ok(DeliveryMethod::Whatsapp),
            other => Err(ParseEnumError {
                kind: "delivery method",
                value: other.to_string(),
            }),
        }
    }
}

/// Raw vendor form as posted by the onboarding page.
///
/// Every field defaults so that a missing field surfaces as a validation
/// message rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgreementSubmission {
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
    pub vendor_signature: String,
    /// `YYYY-MM-DD`; defaults to the signing date when absent.
    pub effective_date: Option<String>,
    pub agreed_to_terms: bool,
}

/// A submission that passed [`AgreementSubmission::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
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
    pub vendor_signature: SignatureData,
    pub effective_date: Option<NaiveDate>,
}

impl AgreementSubmission {
    /// Checks every field and returns either the typed submission or the full
    /// list of problems, in form order.
    ///
    /// # Errors
    ///
    /// Returns the collected validation messages when any field is invalid.
    pub fn validate(&self) -> Result<ValidatedSubmission, Vec<String>> {
        let mut errors = Vec::new();

        let agreement_type = match self.agreement_type.trim().parse::<AgreementType>() {
            Ok(t) => Some(t),
            Err(_) => {
                errors.push("Agreement type must be 'tours' or 'restaurant'".to_string());
                None
            }
        };

        let vendor_name = required(&self.vendor_name, "Business name is required", &mut errors);
        let vendor_address = required(
            &self.vendor_address,
            "Business address is required",
            &mut errors,
        );

        let vendor_email = self.vendor_email.trim().to_string();
        if vendor_email.is_empty() {
            errors.push("Email address is required".to_string());
        } else if !EMAIL_RE.is_match(&vendor_email) {
            errors.push("Valid email is required".to_string());
        }

        let vendor_phone = required(&self.vendor_phone, "Phone number is required", &mut errors);
        let contact_person_name = required(
            &self.contact_person_name,
            "Contact person name is required",
            &mut errors,
        );
        let partnership_level = required(
            &self.partnership_level,
            "Partnership level is required",
            &mut errors,
        );

        let vendor_signature = if self.vendor_signature.trim().is_empty() {
            errors.push("Signature is required".to_string());
            None
        } else {
            match SignatureData::parse(self.vendor_signature.trim()) {
                Ok(sig) => Some(sig),
                Err(e) => {
                    errors.push(format!("Signature is invalid: {e}"));
                    None
                }
            }
        };

        if !self.agreed_to_terms {
            errors.push("You must agree to the terms and conditions".to_string());
        }

        let effective_date = match non_blank(self.effective_date.as_deref()) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push(format!("Effective date must be YYYY-MM-DD, got '{raw}'"));
                    None
                }
            },
        };

        match (agreement_type, vendor_signature) {
            (Some(agreement_type), Some(vendor_signature)) if errors.is_empty() => {
                Ok(ValidatedSubmission {
                    agreement_type,
                    vendor_name,
                    vendor_address,
                    vendor_registration_no: non_blank(self.vendor_registration_no.as_deref()),
                    vendor_email,
                    vendor_phone,
                    vendor_whatsapp: non_blank(self.vendor_whatsapp.as_deref()),
                    contact_person_name,
                    contact_person_title: non_blank(self.contact_person_title.as_deref()),
                    partnership_level,
                    vendor_signature,
                    effective_date,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required(value: &str, message: &str, errors: &mut Vec<String>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(message.to_string());
    }
    trimmed.to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    fn complete_form() -> AgreementSubmission {
        AgreementSubmission {
            agreement_type: "tours".to_string(),
            vendor_name: "Spice Island Tours".to_string(),
            vendor_address: "Stone Town, Zanzibar".to_string(),
            vendor_registration_no: Some("  ".to_string()),
            vendor_email: "bookings@spiceisland.example".to_string(),
            vendor_phone: "+255 777 123 456".to_string(),
            vendor_whatsapp: None,
            contact_person_name: "Amina Said".to_string(),
            contact_person_title: Some("Director".to_string()),
            partnership_level: "growth".to_string(),
            vendor_signature: PIXEL.to_string(),
            effective_date: Some("2026-11-01".to_string()),
            agreed_to_terms: true,
        }
    }

    #[test]
    fn complete_form_validates() {
        let valid = complete_form().validate().expect("valid form");
        assert_eq!(valid.agreement_type, AgreementType::Tours);
        assert_eq!(valid.vendor_registration_no, None);
        assert_eq!(valid.contact_person_title.as_deref(), Some("Director"));
        assert_eq!(
            valid.effective_date,
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let errors = AgreementSubmission::default()
            .validate()
            .expect_err("empty form must fail");
        assert_eq!(
            errors,
            vec![
                "Agreement type must be 'tours' or 'restaurant'",
                "Business name is required",
                "Business address is required",
                "Email address is required",
                "Phone number is required",
                "Contact person name is required",
                "Partnership level is required",
                "Signature is required",
                "You must agree to the terms and conditions",
            ]
        );
    }

    #[test]
    fn malformed_email_and_date_are_reported() {
        let mut form = complete_form();
        form.vendor_email = "not-an-email".to_string();
        form.effective_date = Some("01/11/2026".to_string());
        let errors = form.validate().expect_err("must fail");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Valid email is required");
        assert!(errors[1].starts_with("Effective date must be YYYY-MM-DD"));
    }

    #[test]
    fn signature_that_is_not_a_data_url_is_rejected() {
        let mut form = complete_form();
        form.vendor_signature = "my-signature".to_string();
        let errors = form.validate().expect_err("must fail");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Signature is invalid"));
    }

    #[test]
    fn submission_deserializes_with_missing_fields() {
        let form: AgreementSubmission =
            serde_json::from_str(r#"{"agreement_type":"restaurant"}"#).expect("deserialize");
        assert_eq!(form.agreement_type, "restaurant");
        assert!(form.vendor_name.is_empty());
        assert!(!form.agreed_to_terms);
    }

    #[test]
    fn enum_string_forms_round_trip() {
        for t in AgreementType::ALL {
            assert_eq!(t.as_str().parse::<AgreementType>().unwrap(), t);
        }
        assert_eq!(
            "delivered".parse::<AgreementStatus>().unwrap(),
            AgreementStatus::Delivered
        );
        assert_eq!(
            "whatsapp".parse::<DeliveryMethod>().unwrap(),
            DeliveryMethod::Whatsapp
        );
        let err = "archived".parse::<AgreementStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown agreement status 'archived'");
    }
}
