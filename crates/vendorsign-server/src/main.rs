mod api;
mod middleware;
mod storage;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use vendorsign_notify::{Mailbox, NotifierChain};

use crate::{
    api::{build_app, default_rate_limits, AppState, MailSettings},
    middleware::AuthState,
    storage::LocalDocumentStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = vendorsign_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = vendorsign_core::Catalog::load(&config.catalog_path)
        .with_context(|| format!("loading catalog {}", config.catalog_path.display()))?;

    let pool_config = vendorsign_db::PoolConfig::from_app_config(&config);
    let pool = vendorsign_db::connect_pool(&config.database_url, pool_config).await?;
    vendorsign_db::run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| format!("creating storage dir {}", config.storage_dir.display()))?;
    let store = LocalDocumentStore::new(&config.storage_dir, &config.public_base_url);

    let notifier = NotifierChain::from_config(&config.mail)?;
    tracing::info!(providers = ?notifier.names(), "e-mail notifier chain ready");

    let mail = MailSettings {
        from: Mailbox::named(&config.mail.from_address, &catalog.company().trade_name),
        owner_email: config.mail.owner_email.clone(),
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        vendorsign_core::Environment::Development
    ))?;
    let state = AppState {
        pool,
        catalog: Arc::new(catalog),
        documents_dir: Some(store.root().to_path_buf()),
        store: Arc::new(store),
        notifier: Arc::new(notifier),
        mail: Arc::new(mail),
    };
    let app = build_app(state, auth, default_rate_limits());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "vendorsign server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
