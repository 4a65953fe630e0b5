//! BEP20 Ledger Node
//!
//! Main entry point for running a token node and for the offline helpers
//! that generate keys and sign calls for it.

use bep20_core::call::Call;
use bep20_core::crypto::Address;
use bep20_core::ledger::layout::check_upgrade;
use bep20_core::node::{BlockProduction, GenesisInfo, LedgerNode, NodeConfig, TokenOverrides};
use bep20_core::proxy::LogicVersion;
use bep20_core::rpc::{start_rpc_server, RpcState};
use bep20_core::wallet::{KeyPair, Wallet};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bep20-node", version, about = "BEP20 token ledger node")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the node and its JSON-RPC server
    Run(RunArgs),
    /// Generate a key pair
    Keygen {
        /// Also add the key to this wallet file
        #[arg(long)]
        wallet: Option<PathBuf>,
    },
    /// Sign a call for submission with `sendcall`
    Sign {
        /// Hex private key
        #[arg(long, env = "SIGNER_KEY")]
        key: String,
        /// Sender's next nonce (see `getnonce`)
        #[arg(long)]
        nonce: u64,
        /// Call as JSON, e.g. '{"ledger":{"transfer":{"to":"0x..","amount":10}}}'
        #[arg(long)]
        call: String,
    },
    /// Print the storage layouts and check that each upgrade keeps its fields
    Layout,
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, env = "RPC_PORT")]
    rpc_port: Option<u16>,
    /// Proxy admin; defaults to the token owner without a config file
    #[arg(long, env = "PROXY_ADMIN")]
    admin: Option<Address>,
    /// Logic version label, e.g. token-v1
    #[arg(long)]
    logic: Option<String>,
    /// Seal blocks on a timer instead of per call
    #[arg(long, conflicts_with = "manual")]
    block_interval_ms: Option<u64>,
    /// Advance blocks only through `mineblock`
    #[arg(long)]
    manual: bool,
    /// Expose `mineblock`
    #[arg(long)]
    dev_rpc: bool,
    #[command(flatten)]
    token: TokenOverrides,
}

impl RunArgs {
    fn into_config(self) -> Result<NodeConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)?,
            None => NodeConfig::new(Address::ZERO, "", "", 0),
        };
        self.token.apply(&mut config.token);

        if let Some(admin) = self.admin {
            config.admin = admin;
        } else if self.config.is_none() {
            config.admin = config.token.owner;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(logic) = self.logic {
            config.logic = logic;
        }
        if let Some(millis) = self.block_interval_ms {
            config.block_production = BlockProduction::Interval { millis };
        }
        if self.manual {
            config.block_production = BlockProduction::Manual;
        }
        config.dev_rpc |= self.dev_rpc;

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    match Cli::parse().command {
        Command::Run(args) => run(args.into_config()?).await,
        Command::Keygen { wallet } => keygen(wallet),
        Command::Sign { key, nonce, call } => sign(&key, nonce, &call),
        Command::Layout => layout(),
    }
}

async fn run(config: NodeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let genesis = GenesisInfo::new(&config)?;
    println!("BEP20 LEDGER NODE");
    println!("  Token:          {} ({})", config.token.name, config.token.symbol);
    println!("  Logic:          {} @ {}", genesis.logic, genesis.implementation);
    println!("  Proxy admin:    {}", genesis.admin);
    println!("  Owner:          {}", genesis.owner);
    println!("  Initial supply: {}", genesis.total_supply);
    println!("  Start block:    {}", config.token.start_block);
    println!();

    let node = Arc::new(LedgerNode::open(&config)?);
    info!(height = node.height()?, logic = %node.logic()?, "Node ready");

    if let BlockProduction::Interval { millis } = config.block_production {
        let producer = node.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(millis));
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = producer.mine_block() {
                    error!(error = %e, "Block production stopped");
                    break;
                }
            }
        });
    }

    let state = Arc::new(RpcState {
        node,
        dev_rpc: config.dev_rpc,
    });

    tokio::select! {
        result = start_rpc_server(state, config.rpc_port) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Stopping node...");
        }
    }

    Ok(())
}

fn keygen(wallet_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = KeyPair::generate();
    println!("address:     {}", keypair.address);
    println!("private key: {}", keypair.private_key_hex());

    if let Some(path) = wallet_path {
        let mut wallet = if path.exists() {
            Wallet::load(&path)?
        } else {
            Wallet::new()
        };
        wallet.import_key(&keypair.private_key_bytes())?;
        wallet.save(&path)?;
        info!(path = %path.display(), "Key added to wallet");
    }
    Ok(())
}

fn sign(key: &str, nonce: u64, call: &str) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = KeyPair::from_hex(key)?;
    let call: Call = serde_json::from_str(call)?;
    let signed = keypair.sign_call(call, nonce)?;
    println!("{}", serde_json::to_string(&signed)?);
    Ok(())
}

fn layout() -> Result<(), Box<dyn std::error::Error>> {
    for version in LogicVersion::ALL {
        println!("{} @ {}", version, version.standard_address());
        for (index, field) in version.layout().iter().enumerate() {
            println!("  {:>2}  {:<24} {:?}", index, field.name, field.kind);
        }
    }
    for pair in LogicVersion::ALL.windows(2) {
        check_upgrade(pair[0].layout(), pair[1].layout())?;
        println!("{} -> {}: compatible", pair[0], pair[1]);
    }
    Ok(())
}
