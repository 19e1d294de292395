//! igtrade - command-line access to an IG trading account.
//!
//! Reads non-secret settings from `~/.config/igtrade/config.json`, secrets
//! from the environment (or a `.env` file), and reuses the cached session
//! between runs so most commands never log in.

mod commands;
mod format;

use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use igtrade_core::RuleSet;

use commands::Context;

/// Directory for an optional daily-rolling log file
const LOG_DIR_ENV: &str = "IGTRADE_LOG_DIR";

/// Log file prefix inside `IGTRADE_LOG_DIR`
const LOG_FILE_PREFIX: &str = "igtrade.log";

const USAGE: &str = "\
Usage: igtrade <command> [args]

Session:
  login                          Authenticate (or reuse the cached session)
  logout                         End the session and clear the cache
  clear-cache                    Forget the cached session without logging out
  generate-key                   Print a new base64 key for IG_CACHE_KEY

Account:
  positions                      List open positions
  orders                         List working orders
  confirm <dealReference>        Show the outcome of a deal

Offline:
  validate <rule-set> <file>     Check a JSON request body against its rules
  rules [rule-set]               List the rules of one or all rule-sets

Rule-sets: create-position, close-position, update-position,
           create-working-order, update-working-order

Environment:
  IG_API_KEY, IG_PASSWORD, IG_IDENTIFIER, IG_BASE_URL, IG_CACHE_KEY,
  IGTRADE_LOG_DIR, RUST_LOG";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer; keep it alive until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=igtrade_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    info!(command = args.first().copied().unwrap_or("help"), "igtrade starting");

    match args.as_slice() {
        [] | ["help"] | ["--help"] | ["-h"] => {
            println!("{}", USAGE);
            Ok(())
        }
        ["generate-key"] => commands::generate_key(),
        ["validate", rule_set, path] => commands::validate(parse_rule_set(rule_set)?, Path::new(path)),
        ["rules"] => commands::rules(&RuleSet::ALL),
        ["rules", rule_set] => commands::rules(&[parse_rule_set(rule_set)?]),
        ["login"] => commands::login(&Context::load()?).await,
        ["logout"] => commands::logout(&Context::load()?).await,
        ["clear-cache"] => commands::clear_cache(&Context::load()?),
        ["positions"] => commands::positions(&Context::load()?).await,
        ["orders"] => commands::orders(&Context::load()?).await,
        ["confirm", deal_reference] => commands::confirm(&Context::load()?, deal_reference).await,
        _ => {
            eprintln!("{}", USAGE);
            bail!("Unknown command: {}", args.join(" "))
        }
    }
}

fn parse_rule_set(name: &str) -> Result<RuleSet> {
    name.parse().map_err(anyhow::Error::msg)
}
