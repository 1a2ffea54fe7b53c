//! edgr CLI - query SEC EDGAR filers and filings

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use edgr::{Edgr, FilingQuery, Headers, QueryParams, SecProvider, Symbol};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgr", version)]
#[command(about = "Query SEC EDGAR filers and filings")]
struct Cli {
    /// Identifying User-Agent for SEC requests, e.g. "MyApp/1.0 (contact@example.com)"
    #[arg(long, env = "EDGR_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// IEX Cloud API token
    #[arg(long, env = "IEX_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every public company known to IEX Cloud
    Companies,
    /// Resolve a ticker to its SEC filer
    Filer {
        /// Ticker symbol
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },
    /// List a filer's filings, newest first
    Filings {
        /// Filer CIK
        #[arg(value_name = "CIK")]
        cik: String,

        /// Keep only this form type (e.g. 10-K)
        #[arg(short, long, default_value = "")]
        form: String,

        /// Stop at the first filing accepted before this date (YYYY-MM-DD)
        #[arg(short, long, default_value = "")]
        stop: String,

        /// Ticker to attribute the filings to
        #[arg(long)]
        symbol: Option<String>,

        /// Print skipped entries alongside the filings
        #[arg(long)]
        report: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Companies => {
            let token = cli
                .token
                .context("an IEX Cloud token is required (--token or IEX_TOKEN)")?;
            let client = Edgr::new().with_iex(&token);

            let companies = client
                .list_public_companies(&QueryParams::new(), &Headers::new())
                .await?;
            info!("Listed {} companies", companies.len());
            print_json(&companies)?;
        }
        Commands::Filer { symbol } => {
            let user_agent = require_user_agent(cli.user_agent)?;
            let client = Edgr::new().with_sec(&user_agent);

            let filer = client
                .resolve_filer(&Symbol::new(symbol), &Headers::new())
                .await?;
            print_json(&filer)?;
        }
        Commands::Filings {
            cik,
            form,
            stop,
            symbol,
            report,
        } => {
            let user_agent = require_user_agent(cli.user_agent)?;
            let provider = SecProvider::new(&user_agent);

            let mut query = FilingQuery::parse(&cik, &form, &stop)?;
            if let Some(symbol) = symbol {
                query = query.with_symbol(symbol);
            }

            let result = provider.traverse(&query).await?;
            info!(
                filings = result.filings.len(),
                skipped = result.skipped.len(),
                stopped_at_cutoff = result.stopped_at_cutoff,
                "Traversal finished"
            );

            if report {
                print_json(&result)?;
            } else {
                print_json(&result.filings)?;
            }
        }
    }

    Ok(())
}

fn require_user_agent(user_agent: Option<String>) -> anyhow::Result<String> {
    user_agent
        .filter(|ua| !ua.trim().is_empty())
        .ok_or_else(|| {
            anyhow!("SEC requests need an identifying user agent (--user-agent or EDGR_USER_AGENT)")
        })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
