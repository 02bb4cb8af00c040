//! IP Registry
//!
//! Replays a script of registry calls against a fresh in-memory registry and
//! prints one JSON outcome per step.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ip_registry::{
    Dispatcher, IpRegistry, Principal, RegistryConfig, Result, Script, SystemClock,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// IP Registry - replay registry calls from a YAML or JSON script
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script to replay (.yaml, .yml or .json)
    script: PathBuf,

    /// Caller used for steps that name none
    #[arg(long, env = "IP_REGISTRY_CALLER")]
    caller: Option<String>,

    /// Registry config file (YAML)
    #[arg(long, env = "IP_REGISTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Pretty-print step outcomes
    #[arg(long)]
    pretty: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting IP Registry {}", ip_registry::VERSION);

    let config = match &args.config {
        Some(path) => RegistryConfig::from_path(path)?,
        None => RegistryConfig::default(),
    };
    let registry = IpRegistry::with_config(config, Arc::new(SystemClock))?;
    info!(
        "IP registry initialized ({}-way sharded)",
        registry.config().shard_count
    );

    let mut events = registry.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event.is_state_change() => debug!(?event, "registry event"),
                Ok(event) => info!(id = %event.id(), ?event, "registry mutation denied"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let fallback_caller = args.caller.map(Principal::new).transpose()?;
    let script = Script::from_path(&args.script)?;
    let dispatcher = Dispatcher::new(registry.clone());

    let reports = script.run(&dispatcher, fallback_caller.as_ref())?;
    for report in &reports {
        let line = if args.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        println!("{}", line);
    }

    let stats = registry.stats();
    info!(
        records = registry.len(),
        registrations = stats.registrations,
        transfers = stats.transfers,
        status_changes = stats.status_changes,
        denied = stats.denied,
        not_found = stats.not_found,
        "Replay finished"
    );

    // Dropping every sender closes the channel and lets the logger drain
    drop(dispatcher);
    drop(registry);
    if let Err(e) = event_logger.await {
        warn!("Event logger task failed: {}", e);
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout stays a clean stream of outcomes
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
