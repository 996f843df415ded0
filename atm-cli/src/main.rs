//! ATM CLI - Interactive terminal for the demo bank ATM contract.

use std::path::PathBuf;

use atm::{AccountPanel, Address, AtmConfig, EvmWalletProvider};
use atm_cli::AtmRepl;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// ATM CLI - Interactive bank ATM client
#[derive(Parser, Debug)]
#[command(name = "atm")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON-RPC endpoint of the wallet's node. Without it no wallet is available.
    #[arg(long, env = "ATM_RPC_URL")]
    rpc_url: Option<String>,

    /// Private key to sign with (hex, optional 0x prefix)
    #[arg(long, env = "ATM_PRIVATE_KEY", conflicts_with = "mnemonic")]
    private_key: Option<String>,

    /// BIP39 mnemonic to derive the signing key from
    #[arg(long, env = "ATM_MNEMONIC")]
    mnemonic: Option<String>,

    /// HD derivation index (only with --mnemonic)
    #[arg(long, default_value_t = 0)]
    index: u32,

    /// ATM contract address (overrides the config file)
    #[arg(long)]
    contract: Option<Address>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("atm=debug,atm_cli=debug")
    } else {
        EnvFilter::new("atm=info,atm_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => AtmConfig::from_json_file(path)?,
        None => AtmConfig::default(),
    };
    if let Some(address) = args.contract {
        config = config.contract_address(address);
    }

    tracing::debug!(
        contract = %config.contract_address,
        chains = ?config.accepted_chain_ids,
        "configuration loaded",
    );

    let wallet = match args.rpc_url {
        Some(rpc_url) => {
            let mut builder = EvmWalletProvider::builder()
                .rpc_url(rpc_url)
                .index(args.index);
            if let Some(mnemonic) = args.mnemonic {
                builder = builder.mnemonic(mnemonic);
            }
            if let Some(key) = args.private_key {
                builder = builder.private_key(key);
            }
            EvmWalletProvider::detect(builder).await
        }
        None => None,
    };

    let panel = AccountPanel::mount(config, wallet);
    AtmRepl::new(panel).run().await?;

    Ok(())
}
