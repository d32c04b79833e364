mod family;
mod output;
mod product;
mod server;
mod store;

use std::net::SocketAddr;
use std::path::PathBuf;

use asinkit_core::Environment;
use asinkit_export::TableFormat;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "asinkit")]
#[command(about = "Reconcile Amazon variant families and export them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile the family around each seed ASIN and write its tables
    Family {
        /// One or more seed ASINs
        #[arg(required = true)]
        asins: Vec<String>,

        /// Output format for the tables (csv or xlsx)
        #[arg(long, default_value_t = TableFormat::Csv)]
        format: TableFormat,

        /// Directory to write into (defaults to ASINKIT_OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Also persist each family to the database
        #[arg(long)]
        save: bool,
    },
    /// Reconcile every family found in a storefront, one after another
    Store {
        store_id: String,

        /// Output format for the tables (csv or xlsx)
        #[arg(long, default_value_t = TableFormat::Csv)]
        format: TableFormat,

        /// Directory to write into (defaults to ASINKIT_OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Also persist each family to the database
        #[arg(long)]
        save: bool,
    },
    /// Dump the raw product response for an ASIN to a JSON file
    Raw {
        asin: String,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Write the variant ASIN / parent ASIN listing of a product to CSV
    Variants {
        asin: String,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Serve store batches over HTTP as background jobs
    Serve {
        /// Listen address (defaults to ASINKIT_BIND_ADDR)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Output format of each job's table (csv or xlsx)
        #[arg(long, default_value_t = TableFormat::Xlsx)]
        format: TableFormat,

        /// Directory to write job output into (defaults to ASINKIT_OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = asinkit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.env == Environment::Development)
        .init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Family {
            asins,
            format,
            out_dir,
            save,
        } => family::run_family(&config, &asins, format, out_dir, save).await,
        Commands::Store {
            store_id,
            format,
            out_dir,
            save,
        } => store::run_store(&config, &store_id, format, out_dir, save).await,
        Commands::Raw { asin, out_dir } => product::run_raw(&config, &asin, out_dir).await,
        Commands::Variants { asin, out_dir } => {
            product::run_variants(&config, &asin, out_dir).await
        }
        Commands::Serve {
            bind,
            format,
            out_dir,
        } => server::run_serve(&config, bind, format, out_dir).await,
        Commands::Db { command } => run_db(&config, command).await,
    }
}

async fn run_db(config: &asinkit_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = asinkit_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            asinkit_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = asinkit_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

/// Builds the product-data client from configuration.
///
/// Fails when `RAINFOREST_API_KEY` is not set; only commands that talk to
/// the product API call this.
pub(crate) fn build_client(
    config: &asinkit_core::AppConfig,
) -> anyhow::Result<asinkit_rainforest::RainforestClient> {
    let api_key = config.require_api_key()?;
    asinkit_rainforest::RainforestClient::with_base_url(
        &config.api_base_url,
        api_key,
        &config.amazon_domain,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Rainforest client: {e}"))
}

/// Connects to the database when `save` is set; `None` otherwise.
pub(crate) async fn connect_if_saving(
    config: &asinkit_core::AppConfig,
    save: bool,
) -> anyhow::Result<Option<sqlx::PgPool>> {
    if !save {
        return Ok(None);
    }
    let pool = asinkit_db::connect_pool_from_config(config).await?;
    Ok(Some(pool))
}
