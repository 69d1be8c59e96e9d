//! # Infinity News Scraper
//!
//! A declaratively configured news scraping engine. One orchestrator drives
//! any number of news sites, HTML or JSON, each described by a
//! [`SiteProfile`]: where the listing lives, how fields are found, how pages
//! are addressed and which civil timezone the site writes dates in.
//!
//! ## Pipeline
//!
//! For every profile and every category:
//! 1. **Listing**: fetch page 1..=N of the category (URL or form postback)
//! 2. **Extraction**: find list and item containers, read the summary fields
//! 3. **Dedup**: stop the category at the first post the store already knows
//! 4. **Detail**: fetch the article page for images, tags and body
//! 5. **Normalize**: timestamp to UTC, body to a standalone HTML fragment
//! 6. **Persist**: write the post through to the [`store::PostStore`]
//!
//! ## Entry point
//!
//! [`run_all_sources`] is what a scheduler calls. A failing site never stops
//! the others.

pub mod cli;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod profile;
pub mod sanitize;
pub mod scrapers;
pub mod store;
pub mod timestamp;
pub mod utils;

pub use error::{ErrorKind, ScrapeError};
pub use orchestrator::{ScrapeReport, StopReason, scrape};
pub use profile::SiteProfile;

use http::HttpFetch;
use store::PostStore;
use tracing::{error, info, instrument};

/// Outcome of a full run over every configured site.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<ScrapeReport>,
    /// Sites whose run was aborted, with the reason.
    pub failures: Vec<(String, ScrapeError)>,
}

impl RunSummary {
    pub fn saved_count(&self) -> usize {
        self.reports.iter().map(ScrapeReport::saved_count).sum()
    }
}

/// Scrape every profile in order, isolating failures per profile.
#[instrument(level = "info", skip_all, fields(profiles = profiles.len()))]
pub async fn run_all_sources<F, S>(profiles: &[SiteProfile], fetcher: &F, store: &mut S) -> RunSummary
where
    F: HttpFetch,
    S: PostStore,
{
    let mut summary = RunSummary::default();
    for profile in profiles {
        match scrape(profile, fetcher, store).await {
            Ok(report) => {
                info!(source = %profile.title, saved = report.saved_count(), "Source done");
                summary.reports.push(report);
            }
            Err(e) => {
                error!(source = %profile.title, error = %e, "Source run aborted");
                summary.failures.push((profile.title.clone(), e));
            }
        }
    }
    summary
}

/// Keep the profiles whose title matches one of `titles` (case-insensitive).
/// An empty filter keeps everything.
pub fn select_profiles(profiles: Vec<SiteProfile>, titles: &[String]) -> Vec<SiteProfile> {
    if titles.is_empty() {
        return profiles;
    }
    profiles
        .into_iter()
        .filter(|p| titles.iter().any(|t| t.eq_ignore_ascii_case(&p.title)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::store::MemoryStore;

    fn broken_profile() -> SiteProfile {
        let mut profile = scrapers::fox_business::profile();
        profile.title = "Broken".to_string();
        profile.timezone = Some("Nowhere/Atlantis".to_string());
        profile
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_stop_the_others() {
        let mut fox = scrapers::fox_business::profile();
        fox.categories = [("Money".to_string(), "money".to_string())].into();
        let fetcher = StaticFetcher::new().page(
            "https://www.foxbusiness.com/money",
            r#"<div class="collection collection-river content"><article class="article">
                <h3 class="title"><a href="/money/a">A</a></h3></article></div>"#,
        );
        let mut store = MemoryStore::new();

        let summary = run_all_sources(&[broken_profile(), fox], &fetcher, &mut store).await;
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "Broken");
        assert_eq!(summary.failures[0].1.kind(), ErrorKind::Config);
        assert_eq!(summary.reports.len(), 1);
        // detail page is missing, so the item is skipped but the site still ran
        assert_eq!(summary.reports[0].categories[0].skipped_items, 1);
        assert_eq!(summary.saved_count(), 0);
    }

    #[test]
    fn test_select_profiles() {
        let all = scrapers::builtin();
        assert_eq!(select_profiles(all.clone(), &[]).len(), 4);
        let picked = select_profiles(all, &["fox news".to_string(), scrapers::youm7::TITLE.to_string()]);
        let titles: Vec<_> = picked.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["اليوم السابع", "Fox News"]);
    }
}
