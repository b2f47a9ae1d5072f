//! # Streakbeat — challenge notification scheduler
//!
//! Sends recurring motivational emails for active upload challenges and
//! exposes an HTTP trigger for external-cron deployments.
//!
//! Usage:
//!   streakbeat                 # run the in-process scheduler + gateway
//!   streakbeat --once          # one pipeline pass, print counters, exit
//!   streakbeat --no-scheduler  # gateway only (external cron drives ticks)

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use streakbeat_core::StreakbeatConfig;
use streakbeat_db::PgStore;
use streakbeat_gateway::AppState;
use streakbeat_mailer::SmtpMailer;
use streakbeat_scheduler::{Pipeline, Scheduler};

#[derive(Parser)]
#[command(
    name = "streakbeat",
    version,
    about = "🔥 Streakbeat — challenge notification scheduler"
)]
struct Cli {
    /// Path to config.toml (default: ~/.streakbeat/config.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Run one pipeline pass and exit (for external cron without HTTP)
    #[arg(long)]
    once: bool,

    /// Skip the in-process scheduler; ticks come from the HTTP trigger
    #[arg(long)]
    no_scheduler: bool,

    /// Gateway port override
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "streakbeat=debug,tower_http=debug"
    } else {
        "streakbeat=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load config; env vars override the file for secrets
    let mut config = match &cli.config {
        Some(path) => {
            let mut c = StreakbeatConfig::load_from(path)?;
            c.apply_env();
            c
        }
        None => StreakbeatConfig::load()?,
    };
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    // Missing DB/SMTP credentials are fatal here, before anything spawns
    config.validate()?;

    // Collaborators: Postgres store + SMTP mailer, injected into one pipeline
    let store = PgStore::connect(
        &config.database.url,
        config.database.max_connections,
        config.scheduler.default_interval_minutes,
    )
    .await?;
    store.migrate().await?;

    let mailer = SmtpMailer::new(&config.smtp)?;

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(store),
        Arc::new(mailer),
        &config.app.public_url,
    ));

    if cli.once {
        let summary = pipeline.run_tick(chrono::Utc::now()).await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let scheduler = if cli.no_scheduler {
        None
    } else {
        let scheduler = Arc::new(Scheduler::new(
            pipeline.clone(),
            config.scheduler.tick_secs,
        ));
        scheduler.start();
        Some(scheduler)
    };

    let state = Arc::new(AppState {
        pipeline,
        scheduler: scheduler.clone(),
        cron_secret: config.gateway.cron_secret.clone(),
        start_time: std::time::Instant::now(),
    });

    // Serve until ctrl-c, then stop the scheduler cleanly
    let gateway_config = config.gateway.clone();
    tokio::select! {
        result = streakbeat_gateway::start(&gateway_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, shutting down");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop();
    }
    Ok(())
}
