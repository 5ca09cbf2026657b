//! hiveengine CLI: query Hive Engine nodes and build token transfers.
//!
//! # Commands
//! ```text
//! hiveengine info
//! hiveengine status
//! hiveengine nodes     [--history] [--limit <N>]
//! hiveengine balance   <account> [--symbol <SYM>]
//! hiveengine token     <symbol>
//! hiveengine tokens
//! hiveengine find      <contract> <table> [--query <json>] [--limit <N>] [--offset <N>] [--all]
//! hiveengine pools     [--pair <BASE:QUOTE>]
//! hiveengine positions [--account <name>] [--pair <BASE:QUOTE>]
//! hiveengine book      <symbol> [--sell] [--account <name>] [--limit <N>]
//! hiveengine history   <account> <symbol> [--limit <N>] [--offset <N>]
//! hiveengine transfer  <from> <to> <amount> <symbol> [--memo <text>]
//! ```
//!
//! `--json` switches command output to JSON; `--log-json` does the same for
//! the log lines on stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use hiveengine::market::DEFAULT_BOOK_LIMIT;
use hiveengine::{
    Api, ApiConfig, FindOptions, LiquidityPool, Market, Quantity, Token, TokenPair, Tokens, Wallet,
};
use hiveengine_nodes::Nodes;

mod logging;

#[derive(Parser)]
#[command(
    name = "hiveengine",
    about = "Hive Engine sidechain client",
    long_about = "
Query Hive Engine nodes: blocks, tokens, balances, market books, liquidity
pools and raw contract tables. `transfer` validates and prints the unsigned
custom_json operation; it never signs or broadcasts.

ENVIRONMENT VARIABLES:
  HIVEENGINE_NODES         Comma separated node URLs
  HIVEENGINE_HISTORY_URL   Account history service URL
  RUST_LOG                 Log filter, overrides --log-level
",
    version
)]
struct Cli {
    /// Node base URL; repeat for a fallback list
    #[arg(long = "node", global = true, env = "HIVEENGINE_NODES", value_delimiter = ',')]
    nodes: Vec<String>,

    /// Pick nodes from the Beacon ranking
    #[arg(long, global = true)]
    discover: bool,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace | debug | info | warn | error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest sidechain block
    Info,

    /// Node status
    Status,

    /// Beacon-ranked nodes
    Nodes {
        /// History nodes instead of RPC nodes
        #[arg(long)]
        history: bool,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Token balances of an account
    Balance {
        account: String,
        #[arg(long)]
        symbol: Option<String>,
    },

    /// One token definition
    Token { symbol: String },

    /// Every token symbol
    Tokens,

    /// Raw contract table query
    Find {
        contract: String,
        table: String,
        /// Mongo-style JSON query
        #[arg(long, default_value = "{}")]
        query: String,
        #[arg(long, default_value_t = 1000)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Page through the whole table
        #[arg(long)]
        all: bool,
    },

    /// Liquidity pools
    Pools {
        #[arg(long)]
        pair: Option<String>,
    },

    /// Liquidity positions
    Positions {
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        pair: Option<String>,
    },

    /// Market order book of a token
    Book {
        symbol: String,
        /// Sell side instead of buy side
        #[arg(long)]
        sell: bool,
        #[arg(long)]
        account: Option<String>,
        #[arg(long, default_value_t = DEFAULT_BOOK_LIMIT)]
        limit: u32,
    },

    /// Account history for one token
    History {
        account: String,
        symbol: String,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Build an unsigned token transfer
    Transfer {
        from: String,
        to: String,
        amount: String,
        symbol: String,
        #[arg(long, default_value = "")]
        memo: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level, cli.log_json);

    if let Commands::Nodes { history, limit } = cli.command {
        return cmd_nodes(history, limit, cli.json).await;
    }

    let api = connect(&cli).await?;
    let json = cli.json;

    match cli.command {
        Commands::Info => print_value(&api.get_latest_block_info().await?),
        Commands::Status => print_value(&api.get_status().await?),
        Commands::Nodes { .. } => Ok(()),
        Commands::Balance { account, symbol } => {
            cmd_balance(&api, &account, symbol.as_deref(), json).await
        }
        Commands::Token { symbol } => {
            let token = Token::load(&api, &symbol).await?;
            print_value(&serde_json::to_value(token.info())?)
        }
        Commands::Tokens => cmd_tokens(&api, json).await,
        Commands::Find { contract, table, query, limit, offset, all } => {
            cmd_find(&api, &contract, &table, &query, limit, offset, all, json).await
        }
        Commands::Pools { pair } => cmd_pools(&api, pair.as_deref(), json).await,
        Commands::Positions { account, pair } => {
            let pool = LiquidityPool::load(&api).await?;
            let pair = pair.map(|p| p.parse::<TokenPair>()).transpose()?;
            let rows = pool
                .get_liquidity_positions(account.as_deref(), pair.as_ref(), 1000, 0)
                .await?;
            print_rows(&rows, json)
        }
        Commands::Book { symbol, sell, account, limit } => {
            let market = Market::load(&api).await?;
            let rows = if sell {
                market.get_sell_book(&symbol, account.as_deref(), limit, 0).await?
            } else {
                market.get_buy_book(&symbol, account.as_deref(), limit, 0).await?
            };
            print_rows(&rows, json)
        }
        Commands::History { account, symbol, limit, offset } => {
            let rows = api.get_history(&account, &symbol, limit, offset).await?;
            print_rows(&rows, json)
        }
        Commands::Transfer { from, to, amount, symbol, memo } => {
            let amount: Quantity = amount.parse()?;
            let wallet = Wallet::load(&api, &from).await?;
            let result = wallet.transfer(&to, &amount, &symbol, &memo).await?;
            // Always JSON: the output is meant to be signed elsewhere.
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

// ─── Setup ───────────────────────────────────────────────────────────────────

async fn connect(cli: &Cli) -> Result<Api> {
    let mut config = match &cli.config {
        Some(path) => ApiConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ApiConfig::default(),
    };
    config.apply_env();
    if !cli.nodes.is_empty() {
        config.nodes = cli.nodes.clone();
    }
    if cli.discover {
        config.discover = true;
    }
    tracing::debug!(nodes = ?config.nodes, discover = config.discover, "resolved config");
    Api::from_config(&config).await.context("connecting to hive engine")
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_nodes(history: bool, limit: Option<usize>, json: bool) -> Result<()> {
    let nodes = Nodes::new()?;
    let ranked = if history {
        nodes.beacon_history(limit).await?
    } else {
        nodes.beacon(limit).await?
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }
    for node in &ranked {
        match &node.failing_cause {
            Some(cause) => println!("{:>5.1}  {}  ({cause})", node.rank, node.url),
            None => println!("{:>5.1}  {}", node.rank, node.url),
        }
    }
    Ok(())
}

async fn cmd_balance(api: &Api, account: &str, symbol: Option<&str>, json: bool) -> Result<()> {
    let wallet = Wallet::load(api, account).await?;
    let balances: Vec<_> = match symbol {
        Some(symbol) => wallet.get_token(symbol).into_iter().collect(),
        None => wallet.balances().iter().collect(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&balances)?);
        return Ok(());
    }
    if balances.is_empty() {
        println!("{account}: no balances");
    }
    for b in balances {
        let stake = b.stake.map(|s| s.to_string()).unwrap_or_else(|| "0".into());
        println!("{:<16} {:>24}  staked {}", b.symbol, b.balance.to_string(), stake);
    }
    Ok(())
}

async fn cmd_tokens(api: &Api, json: bool) -> Result<()> {
    let tokens = Tokens::load(api).await?;
    if json {
        let infos: Vec<_> = tokens.iter().collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        for info in tokens.iter() {
            println!("{:<16} {:>2}  {}", info.symbol, info.precision, info.name);
        }
        println!("{} tokens", tokens.len());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_find(
    api: &Api,
    contract: &str,
    table: &str,
    query: &str,
    limit: u32,
    offset: u32,
    all: bool,
    json: bool,
) -> Result<()> {
    let query: Value = serde_json::from_str(query).context("--query must be a JSON object")?;
    if !query.is_object() {
        bail!("--query must be a JSON object");
    }
    let rows = if all {
        api.find_all(contract, table, query).await?
    } else {
        let options = FindOptions::default().with_limit(limit).with_offset(offset);
        api.find(contract, table, query, &options).await?
    };
    print_rows(&rows, json)
}

async fn cmd_pools(api: &Api, pair: Option<&str>, json: bool) -> Result<()> {
    let pool = LiquidityPool::load(api).await?;
    match pair {
        Some(pair) => {
            let pair: TokenPair = pair.parse()?;
            match pool.get_pool(&pair).await? {
                Some(row) => print_value(&row),
                None => bail!("no pool for {pair}"),
            }
        }
        None => print_rows(pool.pools(), json),
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Single objects are always printed as JSON.
fn print_value(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rows(rows: &[Value], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    for row in rows {
        println!("{row}");
    }
    eprintln!("{} rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_and_log_format_are_separate_flags() {
        let cli = Cli::try_parse_from(["hiveengine", "--json", "info"]).unwrap();
        assert!(cli.json);
        assert!(!cli.log_json);

        let cli = Cli::try_parse_from(["hiveengine", "info", "--log-json"]).unwrap();
        assert!(!cli.json);
        assert!(cli.log_json);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
