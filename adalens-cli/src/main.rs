//! adalens - Cardano address lookups from the command line
//!
//! # Usage
//!
//! ```bash
//! # Balance on the preview testnet
//! BLOCKFROST_PROJECT_ID=preview... adalens balance addr_test1...
//!
//! # Second page of mainnet transactions, oldest first, as JSON
//! adalens --network mainnet --json txs addr1... --page 2 --count 20 --order asc
//!
//! # Transactions between two blocks
//! adalens txs addr_test1... --from 1200000 --to 1300000:4
//!
//! # Write a starter adalens.json for mainnet
//! adalens --network mainnet init
//! ```
//!
//! Settings are layered: command-line flags, then environment (a `.env` file
//! is honoured), then the JSON config file, then built-in defaults.

mod config;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use adalens_cardano::{
    BlockBound, CardanoError, CardanoLookup, LookupSession, Network, NetworkConfig, Order,
    TransactionQuery,
};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use config::{CliConfig, DEFAULT_CONFIG_FILE};

/// Consolidated balance and transaction history of a Cardano address
#[derive(Parser, Debug)]
#[command(name = "adalens", version)]
#[command(about = "Look up Cardano address balances and transactions", long_about = None)]
struct Cli {
    /// Network to query (mainnet, preview, preprod)
    #[arg(long, env = "ADALENS_NETWORK")]
    network: Option<Network>,

    /// Blockfrost project id
    #[arg(long, env = "BLOCKFROST_PROJECT_ID", hide_env_values = true)]
    project_id: Option<String>,

    /// JSON config file (default: ./adalens.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconciled balance of an address
    Balance {
        address: String,
    },
    /// Enriched transactions of an address
    Txs {
        address: String,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Transactions per page (1-100)
        #[arg(long, default_value = "5")]
        count: u32,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: Order,

        /// First block, HEIGHT or HEIGHT:INDEX
        #[arg(long)]
        from: Option<BlockBound>,

        /// Last block, HEIGHT or HEIGHT:INDEX
        #[arg(long)]
        to: Option<BlockBound>,
    },
    /// Write a starter config file (--config, or ./adalens.json)
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = err.downcast_ref::<CardanoError>().and_then(guidance) {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

/// What the user can do about a failed lookup
fn guidance(err: &CardanoError) -> Option<&'static str> {
    if err.is_user_correctable() {
        Some("Check the address and options, and that --network matches the address.")
    } else if err.is_retryable() {
        Some("The indexer may be busy or unreachable; try again shortly.")
    } else if matches!(err, CardanoError::RemoteApi { status_code: 403, .. }) {
        Some("The project id was rejected; it must belong to the selected network.")
    } else {
        None
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => {
            let path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            init(&path, cli.network.unwrap_or_default(), force)
        }
        Command::Balance { address } => {
            let (lookup, network) = connect(cli.network, cli.project_id, cli.config.as_deref())?;
            let balance = interruptible(async move { lookup.resolve_balance(&address).await }).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&balance)?);
            } else {
                print!("{}", output::render_balance(&balance, &network));
            }
            Ok(())
        }
        Command::Txs { address, page, count, order, from, to } => {
            let (lookup, network) = connect(cli.network, cli.project_id, cli.config.as_deref())?;
            let query = TransactionQuery { page, count, order, from, to };
            let page =
                interruptible(async move { lookup.list_transactions_page(&address, &query).await }).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", output::render_transactions(&page, &network));
            }
            Ok(())
        }
    }
}

/// Layers flags over the config file and builds the lookup
fn connect(
    network: Option<Network>,
    project_id: Option<String>,
    config_path: Option<&Path>,
) -> Result<(CardanoLookup, NetworkConfig)> {
    let file = CliConfig::load(config_path)?;
    let lookup_config = file.lookup_config(network);
    let network = lookup_config.network.config();
    let project_id = project_id
        .or(file.project_id)
        .ok_or_else(|| anyhow!("no project id: pass --project-id or set BLOCKFROST_PROJECT_ID"))?;

    let lookup = CardanoLookup::new(lookup_config, project_id)?;
    tracing::info!(network = %lookup.network(), indexer = lookup.gateway().base_url(), "lookup ready");
    Ok((lookup, network))
}

fn init(path: &Path, network: Network, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!("{} already exists; pass --force to replace it", path.display()));
    }
    CliConfig::starter(network).save(path)?;
    println!("Wrote {} for {network}", path.display());
    Ok(())
}

/// Runs a lookup that Ctrl-C aborts
async fn interruptible<F, T>(task: F) -> Result<T>
where
    F: std::future::Future<Output = adalens_cardano::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let session = LookupSession::new();
    let outcome = tokio::select! {
        outcome = session.run(task) => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.cancel().await;
            None
        }
    };
    match outcome {
        Some(result) => Ok(result?),
        None => Err(anyhow!("lookup cancelled")),
    }
}
