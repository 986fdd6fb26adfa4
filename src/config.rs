use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::constants::api::DEFAULT_PER_PAGE;
use crate::types::TelegramUser;

/// otcmarket - Telegram OTC marketplace client
///
/// Terminal front-end for the marketplace API: browse listings, open one,
/// and message its seller.
/// Configuration priority: CLI args > Environment variables (.env honoured) > Defaults
#[derive(Parser, Debug)]
#[command(name = "otcmarket")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Telegram OTC marketplace client", long_about = None)]
pub struct CliArgs {
    /// Marketplace web app base URL
    #[arg(long, env = "OTC_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// Per-request timeout in milliseconds (1000-60000); transport default when unset
    #[arg(long, env = "OTC_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Listings per search page (1-100)
    #[arg(long, env = "OTC_PER_PAGE")]
    pub per_page: Option<u32>,

    /// Telegram user id to act as
    #[arg(long, env = "OTC_USER_ID")]
    pub user_id: Option<i64>,

    /// Display name for the acting user
    #[arg(long, env = "OTC_FIRST_NAME", default_value = "")]
    pub first_name: String,

    /// Telegram handle for the acting user (without @)
    #[arg(long, env = "OTC_USERNAME")]
    pub username: Option<String>,

    /// Print the resulting UI snapshot as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List categories
    Categories,
    /// Search listings, grouped by category
    Search {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one listing
    Show { id: String },
    /// Send a message to a listing's seller
    Contact {
        id: String,
        #[arg(long, short)]
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_ms: Option<u64>,
    pub per_page: u32,
}

impl Config {
    /// Web build: the API is served from the page's own origin.
    pub fn for_origin(origin: &str) -> Self {
        Self {
            api_base_url: origin.trim_end_matches('/').to_string(),
            request_timeout_ms: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Build configuration from parsed CLI args.
pub fn from_args(args: &CliArgs) -> Result<Config> {
    validate_url(&args.api_url, "OTC_API_URL")?;

    let request_timeout_ms = args
        .request_timeout_ms
        .map(|ms| validate_in_range(ms, 1000, 60000, "OTC_REQUEST_TIMEOUT_MS"))
        .transpose()?;

    let per_page = validate_in_range(
        args.per_page.unwrap_or(DEFAULT_PER_PAGE),
        1,
        100,
        "OTC_PER_PAGE",
    )?;

    Ok(Config {
        api_base_url: args.api_url.trim_end_matches('/').to_string(),
        request_timeout_ms,
        per_page,
    })
}

/// Acting user for the terminal front-end, if an id was given.
pub fn cli_user(args: &CliArgs) -> Option<TelegramUser> {
    args.user_id.map(|id| TelegramUser {
        id,
        first_name: args.first_name.clone(),
        last_name: None,
        username: args.username.clone().filter(|u| !u.is_empty()),
        language_code: None,
    })
}

/// Load configuration from `.env`, environment and CLI args
pub fn load() -> Result<(Config, CliArgs)> {
    #[cfg(feature = "native")]
    {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
    }
    let args = CliArgs::parse();
    let config = from_args(&args)?;
    Ok((config, args))
}

impl Config {
    /// Print current configuration (useful for debugging)
    pub fn print_summary(&self) {
        eprintln!("otcmarket configuration:");
        eprintln!("  API: {}", self.api_base_url);
        match self.request_timeout_ms {
            Some(ms) => eprintln!("  Request timeout: {ms}ms"),
            None => eprintln!("  Request timeout: transport default"),
        }
        eprintln!("  Page size: {}", self.per_page);
    }
}
