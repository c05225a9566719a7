// crates/warden-cli/src/main.rs
//
// CLI entrypoint for the Warden ledger.
//
// Each invocation opens the RocksDB ledger under `data_dir`, runs exactly one
// operation as `--caller` at ledger time `--at` (default: now), and prints the
// result plus any events it committed.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};

use commands::breaker::BreakerCmd;
use commands::gate::GateCmd;
use commands::risk::RiskCmd;
use commands::Session;
use config::WardenConfig;
use output::OutputFormat;

use warden_core::types::{Address, CallContext, Timestamp};
use warden_store::RocksStore;

/// Warden CLI: identity gate, risk registry and circuit breaker for a pooled
/// yield vault.
#[derive(Parser, Debug)]
#[command(name = "warden", version = "0.1.0", about = "Warden trust-layer ledger CLI")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.warden/config.toml")]
    config: String,

    /// Account submitting the operation (default: configured governance).
    #[arg(long, global = true)]
    caller: Option<Address>,

    /// Ledger time in unix seconds (default: now).
    #[arg(long, global = true)]
    at: Option<Timestamp>,

    /// Verifier address to open the gate with (default: `gate.verifier` from
    /// the config file).
    #[arg(long, global = true)]
    verifier: Option<Address>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the genesis gate and registry configuration.
    Init,

    /// Identity gate: proofs, verification, vaults and gate settings.
    #[command(subcommand)]
    Gate(GateCmd),

    /// Risk registry: protocols, sentinels, scores and threshold.
    #[command(subcommand)]
    Risk(RiskCmd),

    /// Global circuit breaker.
    #[command(subcommand)]
    Breaker(BreakerCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, load_error) = match WardenConfig::load(&cli.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (WardenConfig::default(), Some(e.to_string())),
    };

    let config = config.with_verifier(cli.verifier);

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match load_error {
        None => tracing::debug!("Loaded configuration from {}", cli.config),
        Some(e) => tracing::warn!("Could not load config from {}: {}. Using defaults.", cli.config, e),
    }

    let timestamp = cli.at.unwrap_or_else(now);
    let caller = cli.caller.unwrap_or(config.governance);
    let ctx = CallContext::new(caller, timestamp);

    let data_path = config.data_path();
    std::fs::create_dir_all(&data_path)?;
    let store = RocksStore::open(&data_path)?;
    tracing::debug!("Caller {} at t={} on ledger {}", caller, timestamp, data_path);

    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Table };
    let session = Session::new(config, store, ctx, format);

    match &cli.command {
        Commands::Init => commands::init::run(&session)?,
        Commands::Gate(cmd) => commands::gate::run(cmd, &session)?,
        Commands::Risk(cmd) => commands::risk::run(cmd, &session)?,
        Commands::Breaker(cmd) => commands::breaker::run(cmd, &session)?,
    }

    Ok(())
}

/// Current wall-clock time in unix seconds.
fn now() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
