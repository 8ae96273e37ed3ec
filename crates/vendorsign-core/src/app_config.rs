use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials and addresses for the e-mail providers.
///
/// Every provider is optional; the notifier chain only includes the ones whose
/// credentials are present.
#[derive(Clone, Default)]
pub struct MailConfig {
    pub from_address: String,
    pub owner_email: Option<String>,
    pub timeout_secs: u64,
    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from_email: Option<String>,
    pub forge_api_url: Option<String>,
    pub forge_api_key: Option<String>,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("MailConfig")
            .field("from_address", &self.from_address)
            .field("owner_email", &self.owner_email)
            .field("timeout_secs", &self.timeout_secs)
            .field("resend_api_key", &redact(&self.resend_api_key))
            .field("sendgrid_api_key", &redact(&self.sendgrid_api_key))
            .field("sendgrid_from_email", &self.sendgrid_from_email)
            .field("forge_api_url", &self.forge_api_url)
            .field("forge_api_key", &redact(&self.forge_api_key))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub mail: MailConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("storage_dir", &self.storage_dir)
            .field("public_base_url", &self.public_base_url)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("mail", &self.mail)
            .finish()
    }
}
