mod agreements;
mod catalog;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vendorsign_core::{AgreementStatus, AgreementType, Catalog};

#[derive(Debug, Parser)]
#[command(name = "vendorsign-cli")]
#[command(about = "Vendor agreement service command line interface")]
struct Cli {
    /// Partnership catalog file
    #[arg(
        long,
        global = true,
        env = "VENDORSIGN_CATALOG_PATH",
        default_value = "./config/catalog.yaml"
    )]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List the partnership levels offered for an agreement type
    Levels {
        /// `tours` or `restaurant`
        #[arg(value_parser = parse_agreement_type)]
        agreement_type: AgreementType,
    },
    /// Print the agreement text a vendor reads before signing
    Preview {
        /// `tours` or `restaurant`
        #[arg(value_parser = parse_agreement_type)]
        agreement_type: AgreementType,
        /// Partnership level id (unknown ids use the default commission)
        level: String,
    },
    /// List stored agreements, newest first
    List {
        /// Filter by status (draft, pending, signed, delivered)
        #[arg(long, value_parser = parse_status)]
        status: Option<AgreementStatus>,
        /// Filter by agreement type
        #[arg(long = "type", value_parser = parse_agreement_type)]
        agreement_type: Option<AgreementType>,
        /// Case-insensitive match on vendor name, e-mail or phone
        #[arg(long)]
        search: Option<String>,
        /// Maximum number of agreements to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Draw the sample signature and print it as a PNG data URL
    SampleSignature,
    /// Print the WhatsApp share link for a stored agreement
    WhatsappLink {
        /// Agreement id (UUID)
        id: uuid::Uuid,
    },
}

fn parse_agreement_type(raw: &str) -> Result<AgreementType, String> {
    raw.parse::<AgreementType>().map_err(|e| e.to_string())
}

fn parse_status(raw: &str) -> Result<AgreementStatus, String> {
    raw.parse::<AgreementStatus>().map_err(|e| e.to_string())
}

fn load_catalog(path: &std::path::Path) -> anyhow::Result<Catalog> {
    Catalog::load(path).with_context(|| format!("loading catalog {}", path.display()))
}

async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = vendorsign_core::load_app_config()?;
    let pool_config = vendorsign_db::PoolConfig::from_app_config(&config);
    let pool = vendorsign_db::connect_pool(&config.database_url, pool_config).await?;
    tracing::debug!(env = ?config.env, "database pool ready");
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Migrate) => {
            let pool = connect().await?;
            let applied = vendorsign_db::run_migrations(&pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
        Some(Commands::Levels { agreement_type }) => {
            let catalog = load_catalog(&cli.catalog)?;
            catalog::run_levels(&catalog, agreement_type);
        }
        Some(Commands::Preview {
            agreement_type,
            level,
        }) => {
            let catalog = load_catalog(&cli.catalog)?;
            catalog::run_preview(&catalog, agreement_type, &level);
        }
        Some(Commands::List {
            status,
            agreement_type,
            search,
            limit,
        }) => {
            let pool = connect().await?;
            let filter = vendorsign_db::AgreementFilter {
                status,
                agreement_type,
                search,
                limit: Some(limit),
            };
            agreements::run_list(&pool, &filter).await?;
        }
        Some(Commands::SampleSignature) => {
            let signature = vendorsign_core::signature::sample_signature()?;
            println!("{}", signature.as_str());
        }
        Some(Commands::WhatsappLink { id }) => {
            let catalog = load_catalog(&cli.catalog)?;
            let pool = connect().await?;
            agreements::run_whatsapp_link(&pool, &catalog, id).await?;
        }
        None => println!("vendorsign-cli: run with --help to see commands"),
    }

    Ok(())
}
