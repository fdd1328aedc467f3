//! pgtop - top-like PostgreSQL statistics in the terminal
//!
//! Polls the server's statistics views at a fixed interval, turns counters
//! into per-second rates and shows them next to host and disk activity.

mod config;
mod core;
mod integrations;
mod query;
mod stat;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::app::App;
use crate::core::collector::{frame_channel, Collector};
use crate::core::state::AppState;
use crate::integrations::postgres::{PgSource, StatSource};
use crate::stat::DiskstatsReader;
use crate::ui::theme::Theme;
use crate::view::Views;

#[derive(Parser)]
#[command(name = "pgtop")]
#[command(version)]
#[command(about = "Top-like activity and statistics viewer for PostgreSQL", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Server host or socket directory
    #[arg(short = 'H', long, env = "PGHOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "PGPORT")]
    port: Option<u16>,

    /// Database user
    #[arg(short = 'U', long, env = "PGUSER")]
    user: Option<String>,

    /// Database name
    #[arg(short, long, env = "PGDATABASE")]
    dbname: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

fn setup_logging(verbosity: u8) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // The terminal belongs to the UI, so logs go to a file
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pgtop")
        .join("logs");

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "pgtop.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<config::Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| config::Config::default_path().filter(|p| p.exists()));

    let mut config = match path {
        Some(path) => config::Config::load(&path)?,
        None => config::Config::default(),
    };

    if let Some(host) = &cli.host {
        config.connection.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if let Some(user) = &cli.user {
        config.connection.user = user.clone();
    }
    if let Some(dbname) = &cli.dbname {
        config.connection.dbname = dbname.clone();
    }
    if let Some(interval) = cli.interval {
        config.general.interval_ms = interval;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive for the duration of the program
    let _logging_guard = setup_logging(cli.verbose)?;

    if let Some(Commands::Init { force }) = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => config::Config::default_path()
                .context("no configuration directory on this system")?,
        };
        return config::init_config(&path, force);
    }

    let config = load_config(&cli)?;
    let password = std::env::var("PGPASSWORD").ok();

    let source: Arc<dyn StatSource> = Arc::new(
        PgSource::connect(config.connection_settings(password))
            .await
            .context("cannot connect to PostgreSQL")?,
    );

    let profile = source
        .resolve_profile()
        .await
        .context("cannot determine server capabilities")?;
    tracing::info!(version = %profile.version_string(), recovery = profile.in_recovery, "server profile");

    let mut views = Views::builtin(config.interval());
    views
        .configure(&profile)
        .context("cannot build statistics queries")?;

    let disks = DiskstatsReader::select(
        source.clone(),
        &profile,
        config.sources.diskstats.clone(),
        config.sources.uptime.clone(),
        &config.sources.system_schema,
    );

    let mut collector = Collector::new(
        source.clone(),
        Arc::new(views.clone()),
        disks,
        config.interval(),
    );
    collector
        .prime()
        .await
        .context("cannot read disk statistics")?;

    let (tx, rx) = frame_channel();
    let token = CancellationToken::new();
    let collector_task = tokio::spawn(collector.run(tx, token.clone()));

    let mut state = AppState::new(
        views,
        profile,
        Theme::from_name(&config.display.theme),
        config.display.show_disks,
        config.message_lifetime(),
    );
    state.server_is_local = source.is_local();
    let mut app = App::new(state, token.clone())?;
    let result = app.run(rx).await;

    token.cancel();
    if let Err(e) = collector_task.await {
        tracing::error!(error = %e, "collector task failed");
    }

    result
}
