use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::{info, warn};

use oasis_tape::config::{CliOverrides, Mode, Settings, TradeFormat};
use oasis_tape::onchain::{abi, RpcMarket};
use oasis_tape::report;

/// Dump the offer book or the trade history of a matching market contract.
#[derive(Debug, Parser)]
#[command(name = "oasis-tape", version)]
#[command(group(ArgGroup::new("mode").required(true).args(["orders", "trades"])))]
struct Args {
    /// Address of the market contract
    contract: Option<String>,

    /// JSON-RPC host [default: localhost]
    #[arg(long)]
    rpc_host: Option<String>,

    /// JSON-RPC port [default: 8545]
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Starting block
    #[arg(long, default_value_t = 0)]
    from_block: u64,

    /// Ending block, -1 for the chain head
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    to_block: i64,

    /// Dump the current state of the offer book
    #[arg(long)]
    orders: bool,

    /// Dump all historical trades from the contract
    #[arg(long)]
    trades: bool,

    /// Trade line format (default: tape, or [output].trade_format)
    #[arg(long, value_enum)]
    format: Option<TradeFormat>,

    /// Config file
    #[arg(long, default_value = "oasis-tape.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let settings = if args.config.exists() {
        Settings::load(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        Settings::from_env()?
    };

    let mode = if args.orders { Mode::Orders } else { Mode::Trades };
    let config = settings.resolve(CliOverrides {
        contract: args.contract,
        rpc_host: args.rpc_host,
        rpc_port: args.rpc_port,
        from_block: args.from_block,
        to_block: args.to_block,
        mode,
        trade_format: args.format,
    })?;

    // Initialize logging on stderr; stdout carries the report
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("oasis-tape v{} starting", env!("CARGO_PKG_VERSION"));

    for (sig, ok) in abi::verify_topic_hashes() {
        if !ok {
            warn!(signature = %sig, "topic hash mismatch, event filter will miss logs");
        }
    }

    let market = RpcMarket::connect(
        &config.rpc.host,
        config.rpc.port,
        config.contract,
        config.log_chunk_size,
    )
    .with_context(|| format!("connecting to {}", config.endpoint()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let lines = report::run(&config, &market, &mut out)
        .with_context(|| format!("{:?} report for {}", config.mode, config.contract))?;

    info!(lines = lines, "done");
    Ok(())
}
