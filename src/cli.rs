//! Command-line interface definitions for the scraper binary.
//!
//! All options can be given as flags; the store path can also come from the
//! environment so that a cron entry stays a bare command.

use clap::Parser;

pub const DEFAULT_USER_AGENT: &str = concat!("infinity_news_scraper/", env!("CARGO_PKG_VERSION"));

/// Scrape every configured news site once and store the new posts.
///
/// # Examples
///
/// ```sh
/// # All built-in sites into ./data/posts.json
/// infinity_news_scraper --store ./data/posts.json
///
/// # Only the Fox sites, from a custom profile file
/// infinity_news_scraper --profiles sites.yaml --source "Fox News" --source "Fox Business"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file holding stored sources, categories, tags and posts
    #[arg(short, long, env = "NEWS_STORE_PATH", default_value = "./data/posts.json")]
    pub store: String,

    /// Optional YAML file of site profiles (defaults to the built-in sites)
    #[arg(short, long)]
    pub profiles: Option<String>,

    /// Only scrape the site with this title (repeatable)
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Print the configured sites and their categories, then exit
    #[arg(long)]
    pub list_sources: bool,
}
