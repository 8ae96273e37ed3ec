//! Offline unit tests for vendorsign-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;
use vendorsign_core::app_config::MailConfig;
use vendorsign_core::{AgreementStatus, AgreementType, AppConfig, Environment};
use vendorsign_db::{AgreementRow, DbError, PoolConfig};

fn sample_row() -> AgreementRow {
    AgreementRow {
        id: 1,
        public_id: Uuid::new_v4(),
        agreement_type: "restaurant".to_string(),
        vendor_name: "Mama Kitchen".to_string(),
        vendor_address: "Darajani".to_string(),
        vendor_registration_no: None,
        vendor_email: "mama@kitchen.example".to_string(),
        vendor_phone: "+255 777 000 111".to_string(),
        vendor_whatsapp: None,
        contact_person_name: "Mama".to_string(),
        contact_person_title: None,
        partnership_level: "growth".to_string(),
        vendor_signature: None,
        signed_at: Some(Utc::now()),
        status: "signed".to_string(),
        document_url: None,
        document_key: None,
        document_sha256: None,
        email_sent: false,
        email_sent_at: None,
        whatsapp_sent: false,
        whatsapp_sent_at: None,
        effective_date: None,
        ip_address: None,
        user_agent: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        storage_dir: PathBuf::from("./data/documents"),
        public_base_url: "http://localhost:3000".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        mail: MailConfig::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn agreement_row_parses_stored_enums() {
    let row = sample_row();
    assert_eq!(row.agreement_type().unwrap(), AgreementType::Restaurant);
    assert_eq!(row.status().unwrap(), AgreementStatus::Signed);
}

#[test]
fn agreement_row_rejects_unknown_status() {
    let mut row = sample_row();
    row.status = "archived".to_string();
    assert!(matches!(
        row.status(),
        Err(DbError::InvalidValue { kind: "agreement status", ref value }) if value == "archived"
    ));
}

#[test]
fn whatsapp_number_prefers_dedicated_number() {
    let mut row = sample_row();
    assert_eq!(row.whatsapp_number(), "+255 777 000 111");

    row.vendor_whatsapp = Some("   ".to_string());
    assert_eq!(row.whatsapp_number(), "+255 777 000 111");

    row.vendor_whatsapp = Some("+255 700 999 888".to_string());
    assert_eq!(row.whatsapp_number(), "+255 700 999 888");
}
