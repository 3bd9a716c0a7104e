//! lockvault - generate temporary codes for a Bluetooth padlock
//!
//! Loads (and repairs) the session config, asks which lock to use, then
//! prints one temporary code per 4-hour epoch starting tomorrow, or just the
//! currently active code with `--now`.

mod prompt;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use lockvault_codegen::{CodeSchedule, current_code, generate_codes};
use lockvault_core::AccessTime;
use lockvault_core::constants::{DEFAULT_CONFIG_PATH, DEFAULT_EPOCH_COUNT};
use lockvault_network::{ApiClient, ApiClientConfig};
use lockvault_storage::{DiscoverySource, SessionStore};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Generate temporary codes for locks on a vault account
#[derive(Parser, Debug)]
#[command(name = "lockvault")]
#[command(version, about, long_about = None)]
struct Args {
    /// Session config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Debug logging, including full API responses
    #[arg(short, long)]
    debug: bool,

    /// Discover locks through the product listing (adds names and models)
    #[arg(long)]
    products: bool,

    /// Number of 4-hour epochs to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_EPOCH_COUNT)]
    count: u32,

    /// First access time, "YYYY-MM-DD HH:MM:SS" (default: next local midnight)
    #[arg(short, long)]
    start: Option<AccessTime>,

    /// Only print the code active right now
    #[arg(long, conflicts_with_all = ["count", "start"])]
    now: bool,
}

fn init_logging(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let client = ApiClient::new(ApiClientConfig::default())?;

    let discovery = if args.products {
        DiscoverySource::Products
    } else {
        DiscoverySource::DeviceKeys
    };
    let store = SessionStore::new(&args.config).discovery(discovery);
    let session = store
        .load_and_repair(&client)
        .await
        .context("Error whilst loading config")?;

    let lock = prompt::select_lock(&session.locks, io::stdin().lock(), io::stderr())?;
    info!(device_id = %lock.device_id, kms_id = %lock.kms_id, "Selected lock");

    if args.now {
        let code = current_code(&client, &session.username, &session.token, &lock.kms_id).await?;
        println!("{code}");
        return Ok(());
    }

    let schedule = match args.start {
        Some(start) => CodeSchedule::new(start),
        None => CodeSchedule::starting_tomorrow(Local::now().naive_local())?,
    }
    .with_epoch_count(args.count);

    info!(
        start = %schedule.start(),
        epochs = schedule.epoch_count(),
        "Generating temporary codes"
    );

    let mut codes = generate_codes(
        &client,
        session.username.as_str(),
        session.token.as_str(),
        lock.kms_id.as_str(),
        &schedule,
    )?;

    let mut generated = 0u32;
    while let Some(result) = codes.next().await {
        println!("{result}");
        generated += 1;
    }

    let failures = codes.failures();
    if failures.is_empty() {
        info!("Generated {} codes", generated);
    } else {
        warn!(
            "Generated {} codes, {} epochs failed:",
            generated,
            failures.len()
        );
        for failure in failures {
            warn!(
                "  epoch {} ({}): {}",
                failure.index, failure.access_time, failure.message
            );
        }
    }

    Ok(())
}
