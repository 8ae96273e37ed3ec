//! Domain layer for the vendor agreement service: configuration, the
//! partnership catalog, template substitution, signature capture and the
//! document/delivery content built from a signed agreement.

pub mod agreement;
pub mod app_config;
pub mod catalog;
mod config;
pub mod delivery;
pub mod document;
pub mod signature;
pub mod template;

use thiserror::Error;

pub use agreement::{
    AgreementStatus, AgreementSubmission, AgreementType, DeliveryMethod, ParseEnumError,
    ValidatedSubmission,
};
pub use app_config::{AppConfig, Environment};
pub use catalog::{Catalog, CompanyInfo, PartnershipLevel, PartnershipTerms};
pub use config::{load_app_config, load_app_config_from_env};
pub use delivery::{whatsapp_link, whatsapp_message};
pub use document::{DocumentInput, DocumentParty};
pub use signature::{SignatureData, SignatureError, SignaturePad};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
