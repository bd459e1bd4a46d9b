//! ACCTREG Node Binary

use acctreg_auth::{
    AddressBytesToStringRequest, AddressStringToBytesRequest, Bech32PrefixRequest, GenesisState,
    QueryAccountRequest, QueryAccountsRequest, QueryModuleAccountsRequest, QueryParamsRequest,
};
use acctreg_core::RegistryConfig;
use acctreg_node::NodeBuilder;
use acctreg_state::PageRequest;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "acctreg-node")]
#[command(about = "ACCTREG - address-indexed account registry")]
#[command(version)]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overrides the configuration file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a genesis file into the registry
    Init {
        /// Genesis file path; defaults to empty genesis
        #[arg(short, long)]
        genesis: Option<PathBuf>,
    },

    /// Export params and every account as genesis JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an account at a text address
    Create {
        address: String,
    },

    /// Read-only queries
    #[command(subcommand)]
    Query(QueryCommand),

    /// Address text conversion
    #[command(subcommand)]
    Address(AddressCommand),

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum QueryCommand {
    /// Look up one account
    Account {
        address: String,
    },

    /// List accounts a page at a time
    Accounts {
        #[arg(long, default_value_t = 0)]
        limit: u64,

        /// Resume key (hex) from a previous page
        #[arg(long)]
        key: Option<String>,

        #[arg(long, default_value_t = 0)]
        offset: u64,

        #[arg(long)]
        count_total: bool,

        #[arg(long)]
        reverse: bool,
    },

    /// List every configured module account
    ModuleAccounts,

    Params,

    Bech32Prefix,
}

#[derive(Subcommand)]
enum AddressCommand {
    /// Hex bytes to text
    ToText { hex: String },

    /// Text to hex bytes
    ToBytes { text: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RegistryConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RegistryConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Config = cli.command {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let node = NodeBuilder::new().config(config).build()?;
    let query = node.query();
    let store = node.store();

    match cli.command {
        Commands::Init { genesis } => {
            let genesis = match genesis {
                Some(path) => GenesisState::from_json(&std::fs::read_to_string(&path)?)?,
                None => GenesisState::default(),
            };
            node.init_genesis(&genesis)?;
            info!(accounts = genesis.accounts.len(), "genesis imported");
        }

        Commands::Export { output } => {
            let json = node.export_genesis()?.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!("Genesis exported to: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Create { address } => {
            let account = node.create_account(&address)?;
            print_json(&acctreg_auth::Any::pack(&account)?)?;
        }

        Commands::Query(QueryCommand::Account { address }) => {
            print_json(&query.account(store, Some(QueryAccountRequest { address }))?)?;
        }

        Commands::Query(QueryCommand::Accounts {
            limit,
            key,
            offset,
            count_total,
            reverse,
        }) => {
            let key = key.map(hex::decode).transpose()?.unwrap_or_default();
            let pagination = PageRequest {
                key,
                offset,
                limit,
                count_total,
                reverse,
            };
            let request = QueryAccountsRequest {
                pagination: Some(pagination),
            };
            print_json(&query.accounts(store, Some(request))?)?;
        }

        Commands::Query(QueryCommand::ModuleAccounts) => {
            print_json(&query.module_accounts(store, Some(QueryModuleAccountsRequest {}))?)?;
        }

        Commands::Query(QueryCommand::Params) => {
            print_json(&query.params(store, Some(QueryParamsRequest {}))?)?;
        }

        Commands::Query(QueryCommand::Bech32Prefix) => {
            print_json(&query.bech32_prefix(Some(Bech32PrefixRequest {}))?)?;
        }

        Commands::Address(AddressCommand::ToText { hex }) => {
            let request = AddressBytesToStringRequest {
                address_bytes: hex::decode(hex.trim_start_matches("0x"))?,
            };
            println!("{}", query.address_bytes_to_string(Some(request))?.address_string);
        }

        Commands::Address(AddressCommand::ToBytes { text }) => {
            let request = AddressStringToBytesRequest {
                address_string: text,
            };
            let response = query.address_string_to_bytes(Some(request))?;
            println!("0x{}", hex::encode(response.address_bytes));
        }

        Commands::Config => {}
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
