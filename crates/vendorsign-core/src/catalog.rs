//! Partnership catalog: company identity, per-type partnership levels, the
//! legal templates and the counter-signature artwork.
//!
//! Everything is loaded once at startup from `config/catalog.yaml`; template
//! and asset paths in that file are resolved relative to it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agreement::AgreementType;
use crate::template::{self, KNOWN_PLACEHOLDERS};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub trade_name: String,
    pub address: String,
    pub email: String,
    pub representative: String,
    pub representative_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipLevel {
    pub id: String,
    pub name: String,
    pub commission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fee: Option<String>,
    pub description: String,
}

/// Display name and commission that go into a rendered agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnershipTerms {
    pub name: String,
    pub commission: String,
}

/// One agreement type as loaded from the catalog.
#[derive(Debug, Clone)]
pub struct AgreementKind {
    pub label: String,
    pub title: String,
    pub default_commission: String,
    pub levels: Vec<PartnershipLevel>,
    pub template: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    company: CompanyInfo,
    assets: AssetsFile,
    agreements: AgreementsFile,
}

#[derive(Debug, Deserialize)]
struct AssetsFile {
    countersignature: PathBuf,
    stamp: PathBuf,
}

#[derive(Debug, Deserialize)]
struct AgreementsFile {
    tours: AgreementEntry,
    restaurant: AgreementEntry,
}

#[derive(Debug, Deserialize)]
struct AgreementEntry {
    label: String,
    title: String,
    template: PathBuf,
    default_commission: String,
    levels: Vec<PartnershipLevel>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    company: CompanyInfo,
    tours: AgreementKind,
    restaurant: AgreementKind,
    countersignature_svg: String,
    stamp_svg: String,
}

impl Catalog {
    /// Load and validate the catalog, its templates and its assets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any file cannot be read, the YAML does not
    /// parse, or the catalog fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        let file: CatalogFile = serde_yaml::from_str(&content).map_err(ConfigError::CatalogParse)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let catalog = Self {
            company: file.company,
            tours: load_kind(base, file.agreements.tours)?,
            restaurant: load_kind(base, file.agreements.restaurant)?,
            countersignature_svg: read_file(&base.join(&file.assets.countersignature))?,
            stamp_svg: read_file(&base.join(&file.assets.stamp))?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    #[must_use]
    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    #[must_use]
    pub fn kind(&self, agreement_type: AgreementType) -> &AgreementKind {
        match agreement_type {
            AgreementType::Tours => &self.tours,
            AgreementType::Restaurant => &self.restaurant,
        }
    }

    #[must_use]
    pub fn levels(&self, agreement_type: AgreementType) -> &[PartnershipLevel] {
        &self.kind(agreement_type).levels
    }

    #[must_use]
    pub fn template(&self, agreement_type: AgreementType) -> &str {
        &self.kind(agreement_type).template
    }

    #[must_use]
    pub fn countersignature_svg(&self) -> &str {
        &self.countersignature_svg
    }

    #[must_use]
    pub fn stamp_svg(&self) -> &str {
        &self.stamp_svg
    }

    /// Name and commission for `level_id`.
    ///
    /// An unknown id is not an error: the id itself becomes the name and the
    /// type's default commission applies.
    #[must_use]
    pub fn resolve_terms(&self, agreement_type: AgreementType, level_id: &str) -> PartnershipTerms {
        let kind = self.kind(agreement_type);
        kind.levels.iter().find(|l| l.id == level_id).map_or_else(
            || PartnershipTerms {
                name: level_id.to_string(),
                commission: kind.default_commission.clone(),
            },
            |l| PartnershipTerms {
                name: l.name.clone(),
                commission: l.commission.clone(),
            },
        )
    }

    /// Agreement text for reading before signing: vendor fields become
    /// bracketed hints, level name and commission are filled in.
    #[must_use]
    pub fn agreement_text(&self, agreement_type: AgreementType, level_id: &str) -> String {
        let terms = self.resolve_terms(agreement_type, level_id);
        let values = HashMap::from([
            (
                template::EFFECTIVE_DATE,
                "[To be determined upon signing]".to_string(),
            ),
            (template::VENDOR_NAME, "[Vendor Name]".to_string()),
            (template::VENDOR_ADDRESS, "[Vendor Address]".to_string()),
            (
                template::VENDOR_REGISTRATION,
                "[Registration Number]".to_string(),
            ),
            (template::COMMISSION_RATE, terms.commission),
            (template::PARTNERSHIP_LEVEL, terms.name),
        ]);
        template::substitute(self.template(agreement_type), &values)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let company = [
            ("name", &self.company.name),
            ("trade_name", &self.company.trade_name),
            ("address", &self.company.address),
            ("email", &self.company.email),
            ("representative", &self.company.representative),
            ("representative_title", &self.company.representative_title),
        ];
        for (field, value) in company {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "company.{field} must be non-empty"
                )));
            }
        }

        for agreement_type in AgreementType::ALL {
            validate_kind(agreement_type, self.kind(agreement_type))?;
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogIo {
        path: path.display().to_string(),
        source: e,
    })
}

fn load_kind(base: &Path, entry: AgreementEntry) -> Result<AgreementKind, ConfigError> {
    let template = read_file(&base.join(&entry.template))?;
    Ok(AgreementKind {
        label: entry.label,
        title: entry.title,
        default_commission: entry.default_commission,
        levels: entry.levels,
        template,
    })
}

fn validate_kind(agreement_type: AgreementType, kind: &AgreementKind) -> Result<(), ConfigError> {
    if kind.label.trim().is_empty() || kind.title.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{agreement_type}: label and title must be non-empty"
        )));
    }
    if kind.default_commission.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{agreement_type}: default_commission must be non-empty"
        )));
    }
    if kind.levels.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{agreement_type}: at least one partnership level is required"
        )));
    }

    let mut seen = HashSet::new();
    for level in &kind.levels {
        if level.id.trim().is_empty() || level.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{agreement_type}: partnership level id and name must be non-empty"
            )));
        }
        if level.commission.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{agreement_type}: level '{}' has no commission",
                level.id
            )));
        }
        if !seen.insert(level.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{agreement_type}: duplicate partnership level id '{}'",
                level.id
            )));
        }
    }

    if let Some(unknown) = template::placeholders_in(&kind.template)
        .into_iter()
        .find(|name| !KNOWN_PLACEHOLDERS.contains(&name.as_str()))
    {
        return Err(ConfigError::Validation(format!(
            "{agreement_type}: template uses unknown placeholder {{{{{unknown}}}}}"
        )));
    }
    Ok(())
}
