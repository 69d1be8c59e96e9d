//! # Infinity News Scraper
//!
//! One run of the scraper: load the site profiles, open the post store,
//! scrape every site once and exit. Scheduling is left to cron or a systemd
//! timer.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=info infinity_news_scraper --store ./data/posts.json
//! ```

use clap::Parser;
use infinity_news_scraper::cli::Cli;
use infinity_news_scraper::http::ReqwestFetcher;
use infinity_news_scraper::profile::load_profiles;
use infinity_news_scraper::store::JsonFileStore;
use infinity_news_scraper::utils::ensure_writable_dir;
use infinity_news_scraper::{run_all_sources, scrapers, select_profiles};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news scrape starting up");

    let args = Cli::parse();
    debug!(?args.store, ?args.profiles, ?args.sources, "Parsed CLI arguments");

    let profiles = match &args.profiles {
        Some(path) => load_profiles(path).await?,
        None => scrapers::builtin(),
    };
    let profiles = select_profiles(profiles, &args.sources);
    if profiles.is_empty() {
        warn!(filter = ?args.sources, "No site profile matches the source filter");
    }

    if args.list_sources {
        for profile in &profiles {
            println!("{} ({})", profile.title, profile.base_url);
            println!("  categories: {}", profile.categories.keys().join(", "));
        }
        return Ok(());
    }

    // Early check: the store directory must be writable before any request goes out
    let store_dir = Path::new(&args.store)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());
    if let Err(e) = ensure_writable_dir(&store_dir).await {
        error!(
            path = %store_dir,
            error = %e,
            "Store directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let mut store = JsonFileStore::open(&args.store).await?;
    let fetcher = ReqwestFetcher::new(&args.user_agent, Duration::from_secs(args.timeout_secs))?;

    let summary = run_all_sources(&profiles, &fetcher, &mut store).await;

    for report in &summary.reports {
        for category in &report.categories {
            info!(
                source = %report.source,
                category = %category.category,
                saved = category.saved.len(),
                skipped = category.skipped_items,
                failed_pages = category.failed_pages,
                stop = ?category.stop,
                "Category summary"
            );
        }
    }
    for (source, e) in &summary.failures {
        error!(%source, error = %e, "Source failed");
    }

    info!(
        saved = summary.saved_count(),
        failed_sources = summary.failures.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "news scrape finished"
    );
    Ok(())
}
