use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use x1swap_sdk::{
    ActionFailure, ActionOutcome, ActionReceipt, Address, AmountB, DexConfig, Mode, RpcWallet,
    SwapSession,
};

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the X1-Swap banner to stdout. Shows the built-in defaults; a
/// `--config` file may override them.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    let defaults = DexConfig::default();
    let tokens = defaults
        .tokens
        .iter()
        .map(|t| if t.native { format!("{} (native)", t.symbol) } else { t.symbol.clone() })
        .collect::<Vec<_>>()
        .join(" · ");
    println!();
    println!("  X1-Swap  v{ver}  ·  swap and add liquidity through the X1 router");
    println!("  {}", "─".repeat(62));
    println!("  Router    {}  (default)", defaults.router);
    println!("  Wallet    {}  (EIP-1193 over JSON-RPC)", defaults.wallet_url);
    println!("  Tokens    {tokens}");
    println!("  Slippage  none: every router call accepts any output");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// X1-Swap: wallet-driven swaps and liquidity on the X1 router.
///
/// Every command supports --json for machine-readable output.
/// The wallet endpoint can also be set via X1SWAP_WALLET_URL.
#[derive(Parser)]
#[command(
    name         = "x1swap",
    version      = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"), "\n",
        "Network:   X1 (router and tokens: run `x1swap tokens`)\n",
        "Decimals:  18 assumed for every token\n",
        "License:   MIT",
    ),
    about        = "Connect a wallet, quote, swap and add liquidity on the X1 router.",
    after_help   = "\
ENVIRONMENT:
  X1SWAP_WALLET_URL  Wallet JSON-RPC endpoint  [default: http://127.0.0.1:1248]
  RUST_LOG           Log filter for stderr output  [default: warn]

QUICK START:
  x1swap tokens
  x1swap connect
  x1swap quote         --in X1T --out TKA --amount 1
  x1swap swap          --in X1T --out TKA --amount 1
  x1swap add-liquidity --a X1T --b TKA --amount-a 1 --amount-b 2"
)]
struct Cli {
    /// TOML deployment config (router, tokens, timeouts)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Wallet JSON-RPC endpoint; overrides the config file
    #[arg(long, global = true, value_name = "URL", env = "X1SWAP_WALLET_URL")]
    wallet_url: Option<String>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured tokens
    Tokens,

    /// Request wallet access and print the granted account
    Connect,

    /// Quote a swap without sending any transaction
    ///
    /// Calls the router's getAmountsOut. Prints "No Pool" when the
    /// router cannot price the pair.
    #[command(
        after_help = "\
EXAMPLES:
  x1swap quote --in X1T --out TKA --amount 1
  x1swap quote --in TKA --out X1T --amount 0.25 --json"
    )]
    Quote {
        /// Token to pay: symbol or listed address
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,

        /// Token to receive: symbol or listed address
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,

        /// Amount to pay (decimal, 18 decimals assumed)
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
    },

    /// Swap an exact input amount
    ///
    /// Native → token uses swapExactETHForTokens. Token → native first
    /// approves the router if the allowance is short, then calls
    /// swapExactTokensForETH. No minimum output is enforced.
    #[command(
        after_help = "\
EXAMPLES:
  # Pay 1 X1T, receive TKA
  x1swap swap --in X1T --out TKA --amount 1

  # Pay 3 TKA, receive X1T (approval sent first if needed)
  x1swap swap --in TKA --out X1T --amount 3 --json"
    )]
    Swap {
        /// Token to pay: symbol or listed address
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,

        /// Token to receive: symbol or listed address
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,

        /// Amount to pay (decimal, 18 decimals assumed)
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
    },

    /// Add liquidity to a native/token pair via addLiquidityETH
    ///
    /// Exactly one side must be the native token. The token side is
    /// approved first if the allowance is short.
    #[command(
        after_help = "\
EXAMPLES:
  x1swap add-liquidity --a X1T --b TKA --amount-a 1 --amount-b 2"
    )]
    AddLiquidity {
        /// First token: symbol or listed address
        #[arg(long = "a", value_name = "TOKEN")]
        token_a: String,

        /// Second token: symbol or listed address
        #[arg(long = "b", value_name = "TOKEN")]
        token_b: String,

        /// Amount of the first token
        #[arg(long, value_name = "AMOUNT")]
        amount_a: String,

        /// Amount of the second token
        #[arg(long, value_name = "AMOUNT")]
        amount_b: String,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref(), cli.wallet_url.as_deref())?;

    match &cli.command {
        Commands::Tokens => cmd_tokens(&config, cli.json)?,
        Commands::Connect => cmd_connect(&config, cli.json).await?,
        Commands::Quote { token_in, token_out, amount } => {
            cmd_quote(&config, token_in, token_out, amount, cli.json).await?;
        }
        Commands::Swap { token_in, token_out, amount } => {
            cmd_swap(&config, token_in, token_out, amount, cli.json).await?;
        }
        Commands::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
            cmd_add_liquidity(&config, token_a, token_b, amount_a, amount_b, cli.json).await?;
        }
    }

    Ok(())
}

// ─── Setup helpers ────────────────────────────────────────────────────────────

fn load_config(path: Option<&std::path::Path>, wallet_url: Option<&str>) -> Result<DexConfig> {
    let mut config = match path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            DexConfig::load(p).with_context(|| format!("loading {}", p.display()))?
        }
        None => DexConfig::default(),
    };
    if let Some(url) = wallet_url {
        config.wallet_url = url.to_string();
    }
    Ok(config)
}

/// Probe the wallet endpoint and build a session. A silent endpoint yields a
/// session without a wallet, which reports "not installed" on connect.
async fn open_session(config: &DexConfig) -> Result<SwapSession<RpcWallet>> {
    let deployment = config.resolve().context("invalid deployment config")?;
    let wallet = RpcWallet::detect(&config.wallet_url).await.map(Arc::new);
    info!(
        router   = %deployment.router,
        wallet   = %config.wallet_url,
        detected = wallet.is_some(),
        "session opened"
    );
    Ok(SwapSession::new(deployment, wallet))
}

/// Connect, reporting failures the same way the executor does.
async fn connect(
    session:     &SwapSession<RpcWallet>,
    command:     &str,
    json_output: bool,
) -> Result<Address> {
    session
        .connect()
        .await
        .map_err(|e| report_failure(command, ActionFailure::from(e), json_output))
}

fn report_failure(command: &str, failure: ActionFailure, json_output: bool) -> anyhow::Error {
    if json_output {
        println!("{}", json!({
            "status":  "error",
            "command": command,
            "kind":    failure.kind,
            "message": failure.message,
            "detail":  failure.detail,
        }));
    }
    anyhow!(failure.message)
}

/// Unwrap a confirmed executor outcome.
fn expect_receipt(command: &str, outcome: ActionOutcome, json_output: bool) -> Result<ActionReceipt> {
    match outcome {
        ActionOutcome::Succeeded(receipt) => Ok(receipt),
        ActionOutcome::Failed(failure) => Err(report_failure(command, failure, json_output)),
        ActionOutcome::Skipped(reason) => Err(anyhow!("Nothing submitted ({reason:?})")),
        ActionOutcome::Connected(account) => {
            Err(anyhow!("Wallet connected as {account}; run the command again"))
        }
    }
}

fn opt_hash(hash: Option<impl ToString>) -> serde_json::Value {
    hash.map(|h| json!(h.to_string())).unwrap_or(serde_json::Value::Null)
}

// ─── tokens ──────────────────────────────────────────────────────────────────

fn cmd_tokens(config: &DexConfig, json_output: bool) -> Result<()> {
    let deployment = config.resolve().context("invalid deployment config")?;

    if json_output {
        let tokens: Vec<_> = deployment
            .tokens
            .iter()
            .map(|t| json!({
                "symbol":  t.symbol,
                "name":    t.name,
                "address": t.address.to_string(),
                "native":  t.native,
            }))
            .collect();
        println!("{}", json!({
            "status":  "ok",
            "command": "tokens",
            "router":  deployment.router.to_string(),
            "tokens":  tokens,
        }));
    } else {
        println!("─── Tokens ───────────────────────────────────────────────────────");
        println!("  Router           {}", deployment.router);
        println!();
        for t in deployment.tokens.iter() {
            let tag = if t.native { "  (native)" } else { "" };
            println!("  {:<6} {:<14} {}{tag}", t.symbol, t.name, t.address);
        }
    }
    Ok(())
}

// ─── connect ─────────────────────────────────────────────────────────────────

async fn cmd_connect(config: &DexConfig, json_output: bool) -> Result<()> {
    let session = open_session(config).await?;
    let account = connect(&session, "connect", json_output).await?;

    if json_output {
        println!("{}", json!({
            "status":     "ok",
            "command":    "connect",
            "wallet_url": config.wallet_url,
            "account":    account.to_string(),
        }));
    } else {
        println!("─── Wallet Connected ─────────────────────────────────────────────");
        println!("  Endpoint         {}", config.wallet_url);
        println!("  Account          {account}");
    }
    Ok(())
}

// ─── quote ───────────────────────────────────────────────────────────────────

async fn cmd_quote(
    config:      &DexConfig,
    token_in:    &str,
    token_out:   &str,
    amount:      &str,
    json_output: bool,
) -> Result<()> {
    let session = open_session(config).await?;
    connect(&session, "quote", json_output).await?;

    session
        .select_token_a(token_in)
        .await
        .with_context(|| format!("--in: expected one of {}", session.tokens().symbols()))?;
    session
        .select_token_b(token_out)
        .await
        .with_context(|| format!("--out: expected one of {}", session.tokens().symbols()))?;
    let quote = session.set_amount_a(amount).await.context("--amount")?;

    let form = session.snapshot().form().clone();
    if json_output {
        println!("{}", json!({
            "status":     "ok",
            "command":    "quote",
            "in":         form.token_a.symbol,
            "out":        form.token_b.symbol,
            "amount_in":  form.amount_a,
            "amount_out": quote_json(&quote),
            "no_pool":    quote == AmountB::NoPool,
        }));
    } else {
        println!("─── Swap Quote ───────────────────────────────────────────────────");
        println!("  Pay              {:>20}  {}", form.amount_a, form.token_a.symbol);
        println!("  Receive (est.)   {:>20}  {}", quote.display(), form.token_b.symbol);
        println!("  Min accepted     {:>20}  (no slippage guard)", 0);
    }
    Ok(())
}

fn quote_json(quote: &AmountB) -> serde_json::Value {
    match quote {
        AmountB::Value(v) => json!(v),
        AmountB::Empty | AmountB::NoPool => serde_json::Value::Null,
    }
}

// ─── swap ────────────────────────────────────────────────────────────────────

async fn cmd_swap(
    config:      &DexConfig,
    token_in:    &str,
    token_out:   &str,
    amount:      &str,
    json_output: bool,
) -> Result<()> {
    let session = open_session(config).await?;
    let account = connect(&session, "swap", json_output).await?;

    session
        .select_token_a(token_in)
        .await
        .with_context(|| format!("--in: expected one of {}", session.tokens().symbols()))?;
    session
        .select_token_b(token_out)
        .await
        .with_context(|| format!("--out: expected one of {}", session.tokens().symbols()))?;
    let quote = session.set_amount_a(amount).await.context("--amount")?;
    let form = session.snapshot().form().clone();

    let receipt = expect_receipt("swap", session.execute().await, json_output)?;

    if json_output {
        println!("{}", json!({
            "status":      "ok",
            "command":     "swap",
            "account":     account.to_string(),
            "in":          form.token_a.symbol,
            "out":         form.token_b.symbol,
            "amount_in":   form.amount_a,
            "quoted_out":  quote_json(&quote),
            "approval_tx": opt_hash(receipt.approval),
            "tx":          receipt.transaction.to_string(),
            "block":       receipt.block_number,
        }));
    } else {
        println!("─── Swap Executed ────────────────────────────────────────────────");
        println!("  Direction        {} → {}", form.token_a.symbol, form.token_b.symbol);
        println!("  Account          {account}");
        println!("  Sold             {:>20}  {}", form.amount_a, form.token_a.symbol);
        println!("  Quoted out       {:>20}  {}", quote.display(), form.token_b.symbol);
        if let Some(approval) = receipt.approval {
            println!("  Approval         {approval}");
        }
        println!("  Transaction      {}", receipt.transaction);
        if let Some(block) = receipt.block_number {
            println!("  Block            {block}");
        }
    }
    Ok(())
}

// ─── add-liquidity ───────────────────────────────────────────────────────────

async fn cmd_add_liquidity(
    config:      &DexConfig,
    token_a:     &str,
    token_b:     &str,
    amount_a:    &str,
    amount_b:    &str,
    json_output: bool,
) -> Result<()> {
    let session = open_session(config).await?;
    let account = connect(&session, "add-liquidity", json_output).await?;

    session.set_mode(Mode::Liquidity).await;
    session
        .select_token_a(token_a)
        .await
        .with_context(|| format!("--a: expected one of {}", session.tokens().symbols()))?;
    session
        .select_token_b(token_b)
        .await
        .with_context(|| format!("--b: expected one of {}", session.tokens().symbols()))?;
    session.set_amount_a(amount_a).await.context("--amount-a")?;
    session.set_amount_b(amount_b).context("--amount-b")?;
    let form = session.snapshot().form().clone();

    let receipt = expect_receipt("add-liquidity", session.execute().await, json_output)?;

    if json_output {
        println!("{}", json!({
            "status":      "ok",
            "command":     "add-liquidity",
            "account":     account.to_string(),
            "token_a":     form.token_a.symbol,
            "token_b":     form.token_b.symbol,
            "amount_a":    form.amount_a,
            "amount_b":    form.amount_b.display(),
            "approval_tx": opt_hash(receipt.approval),
            "tx":          receipt.transaction.to_string(),
            "block":       receipt.block_number,
        }));
    } else {
        println!("─── Liquidity Added ──────────────────────────────────────────────");
        println!("  Pair             {}-{}", form.token_a.symbol, form.token_b.symbol);
        println!("  Account          {account}");
        println!("  Deposited A      {:>20}  {}", form.amount_a, form.token_a.symbol);
        println!("  Deposited B      {:>20}  {}", form.amount_b.display(), form.token_b.symbol);
        if let Some(approval) = receipt.approval {
            println!("  Approval         {approval}");
        }
        println!("  Transaction      {}", receipt.transaction);
        println!();
        println!("  Minimum amounts were zero; the router may have used a different ratio.");
    }
    Ok(())
}
