//! Netzone API server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use netzone_api::api::pages::{Pages, CONTACT_PAGE, ERROR_PAGE, INDEX_PAGE};
use netzone_api::api::{create_router, AppState};
use netzone_api::config::Config;
use netzone_api::data::{DataDir, FileSecret, APPS_FILE, V2RAYS_FILE};
use netzone_api::ApiError;
use netzone_api::utils::shutdown_signal;

/// Netzone web backend.
#[derive(Parser, Debug)]
#[command(name = "netzone-api")]
#[command(about = "Static pages, file-backed JSON API and social redirects for Netzone")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Command-line overrides for values otherwise taken from the environment.
#[derive(clap::Args, Debug, Clone, Default)]
struct Overrides {
    /// Address to bind.
    #[arg(long, global = true)]
    host: Option<String>,

    /// HTTP server port.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Directory holding apps.json and free_v2rays.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// File holding the API secret key.
    #[arg(long, global = true)]
    secret_key_file: Option<PathBuf>,

    /// Directory holding the HTML pages.
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP requests (default).
    Run,

    /// Check configuration validity and the files it points at.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("netzone_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(&args.overrides)?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Run) | None => cmd_run(config).await,
    }
}

/// Load configuration from the environment and apply CLI overrides.
fn load_config(overrides: &Overrides) -> netzone_api::Result<Config> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        ApiError::from(e)
    })?;

    if let Some(host) = &overrides.host {
        config.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(dir) = &overrides.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(path) = &overrides.secret_key_file {
        config.secret_key_file = path.clone();
    }
    if let Some(dir) = &overrides.templates_dir {
        config.templates_dir = dir.clone();
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(ApiError::InvalidConfig(e));
    }

    Ok(config)
}

/// Print the effective configuration and whether each expected file exists.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    let data = DataDir::new(&config.data_dir);
    let secret = FileSecret::new(&config.secret_key_file);
    let pages = Pages::new(&config.templates_dir);

    println!("======================================================================");
    println!("NETZONE API - CONFIGURATION CHECK");
    println!("======================================================================");
    println!("  Listen address: {}", config.bind_addr());
    println!("  Data directory: {}", data.root().display());
    println!("  Secret key file: {}", secret.path().display());
    println!("  Templates directory: {}", pages.dir().display());
    println!("----------------------------------------------------------------------");

    let files = expected_files(&data, &secret, &pages);
    for path in &files {
        let state = if path.is_file() { "OK" } else { "MISSING" };
        println!("  {:<8} {}", state, path.display());
    }

    if !secret.path().is_file() {
        println!("  WARNING: no secret key file; every /api/v2rays request will be rejected");
    }

    println!("======================================================================");
    println!("{}", check_summary(&files));
    println!("======================================================================");

    Ok(())
}

/// Every file the service reads, in display order.
fn expected_files(data: &DataDir, secret: &FileSecret, pages: &Pages) -> Vec<PathBuf> {
    vec![
        secret.path().to_path_buf(),
        data.root().join(APPS_FILE),
        data.root().join(V2RAYS_FILE),
        pages.dir().join(INDEX_PAGE),
        pages.dir().join(CONTACT_PAGE),
        pages.dir().join(ERROR_PAGE),
    ]
}

fn check_summary(files: &[PathBuf]) -> String {
    let missing = files.iter().filter(|path| !path.is_file()).count();
    if missing == 0 {
        "CONFIGURATION CHECK PASSED".to_string()
    } else {
        format!("CONFIGURATION CHECK PASSED WITH WARNINGS: {missing} file(s) missing")
    }
}

/// Serve HTTP requests until a shutdown signal arrives.
async fn cmd_run(config: Config) -> anyhow::Result<()> {
    info!(
        data_dir = %config.data_dir.display(),
        templates_dir = %config.templates_dir.display(),
        "Configuration loaded successfully"
    );

    let app_state = AppState::from_config(&config);
    let router = create_router(app_state);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .context("invalid host/port")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("HTTP server stopped");
    Ok(())
}
