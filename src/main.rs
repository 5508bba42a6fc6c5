mod auth;
mod comfy_table;
mod forecast;
mod indicators;
mod market_data;
mod pipeline;
mod portfolio;
mod storage_utils;
mod symbols;
mod tui;

use crate::auth::{CredentialStore, JsonCredentialStore};
use crate::market_data::{MarketDataProvider, YahooProvider};
use crate::storage_utils::{AppConfig, AsyncStorageManager};
use anyhow::bail;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    about = "Daily-bar stock analysis with a 30-day forecast and a portfolio suggestion"
)]
struct Cli {
    /// Comma-separated ticker symbols, e.g. "AAPL, TSLA, MSFT".
    symbols: Option<String>,

    /// Open the interactive dashboard instead of printing a table.
    #[arg(long)]
    tui: bool,

    /// Create an account (needs --username and --password) and exit.
    #[arg(long)]
    signup: bool,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let storage = AsyncStorageManager::new_relative("storage").await?;
    let config: AppConfig = storage.load("config").await.unwrap_or_default();
    let store = JsonCredentialStore::new(storage.clone());

    if cli.signup {
        let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
            bail!("--signup needs --username and --password");
        };
        if store.create(username, password).await? {
            println!("✅ Account created successfully! Log in with --username/--password.");
        } else {
            println!("❌ Username already exists.");
        }
        return Ok(());
    }

    if config.auth.required {
        let authenticated = match (&cli.username, &cli.password) {
            (Some(username), Some(password)) => store.authenticate(username, password).await?,
            _ => false,
        };
        if !authenticated {
            println!("❌ Invalid username or password");
            return Ok(());
        }
        tracing::info!(user = cli.username.as_deref().unwrap_or(""), "login ok");
    }

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooProvider::new(&config.market)?);

    if cli.tui {
        return tui::run_tui(provider, config).await;
    }

    let Some(raw_symbols) = cli.symbols.as_deref() else {
        bail!("pass a comma-separated symbol list, or use --tui");
    };

    let batch = pipeline::run_batch(provider.as_ref(), raw_symbols, &config).await;
    comfy_table::print_report(&batch, &config.currency);

    Ok(())
}
