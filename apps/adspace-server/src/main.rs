mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adspace::api::rest::{TokenVerifier, router};
use adspace::domain::clock::SystemClock;
use adspace::domain::ports::ObjectStore;
use adspace::domain::service::Service;
use adspace::infra::media::{CloudinarySettings, CloudinaryStore, InMemoryStore};
use adspace::infra::storage::migrations::Migrator;
use adspace::infra::storage::repositories;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::ExposeSecret;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{AppConfig, LoggingConfig, ObjectStoreConfig, ObjectStoreKind};

/// Adspace Server - ad-placement marketplace API
#[derive(Parser)]
#[command(name = "adspace-server")]
#[command(about = "Adspace Server - ad-placement marketplace API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (ADSPACE__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_port(cli.port);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!(bind_addr = %config.server.bind_addr, "Adspace Server starting");

    let conn = connect(&config).await?;
    let store = build_store(&config.object_store)?;
    let service = Service::new(
        repositories(conn),
        store,
        Arc::new(SystemClock),
        config.adspace,
    );
    let verifier = TokenVerifier::hs256(config.auth.jwt_secret.expose_secret().as_bytes());

    let app = router(Arc::new(service), Arc::new(verifier)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Adspace Server stopped");
    Ok(())
}

async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(config.database.dsn.clone());
    opts.max_connections(config.database.max_connections)
        .sqlx_logging(false);

    let conn = Database::connect(opts)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&conn, None)
        .await
        .context("failed to run migrations")?;
    tracing::info!("database ready");
    Ok(conn)
}

fn build_store(config: &ObjectStoreConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.kind {
        ObjectStoreKind::Memory => {
            tracing::warn!("using in-memory object store; uploaded media is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        ObjectStoreKind::Cloudinary => {
            let store = CloudinaryStore::new(CloudinarySettings {
                base_url: config.base_url.clone(),
                cloud_name: config.cloud_name.clone(),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            })?;
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
