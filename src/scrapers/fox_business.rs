//! [Fox Business](https://www.foxbusiness.com).
//!
//! Section pages are a single "river" of article cards; only the first page
//! is read. Each card carries one category pill, used as the post's tag.

use super::categories;
use crate::extract::Descriptor;
use crate::extract::tree::{TreeLayout, TreeTags};
use crate::pagination::Pagination;
use crate::profile::{CategoryUrl, Layout, SiteProfile};
use std::collections::BTreeMap;

pub fn profile() -> SiteProfile {
    let mut layout = TreeLayout::new(
        Descriptor::new("div", "class", "collection collection-river content"),
        Descriptor::new("article", "class", "article"),
        Descriptor::new("h3", "class", "title"),
    );
    layout.description = Descriptor::new("p", "class", "dek");
    layout.timestamp = Descriptor::new("time", "class", "time");
    layout.tags = TreeTags::ItemText {
        element: Descriptor::new("span", "class", "pill-text"),
    };

    SiteProfile {
        title: "Fox Business".to_string(),
        base_url: "https://www.foxbusiness.com".to_string(),
        categories: categories(&[
            ("Money", "money"),
            ("Markets", "markets"),
            ("Technology", "technology"),
            ("Sports", "sports"),
        ]),
        category_url: CategoryUrl::Join,
        pagination: Pagination::Single,
        layout: Layout::Tree(layout),
        body: Descriptor::new("div", "class", "article-body"),
        body_exclude: Vec::new(),
        fetch_detail: true,
        request_delay_ms: 0,
        max_pages: 1,
        max_pages_by_category: BTreeMap::new(),
        timezone: Some("UTC".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::orchestrator::scrape;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    const RIVER: &str = r#"<html><body>
        <div class="collection collection-river content">
          <article class="article story-1">
            <div class="m"><a href="/markets/stocks-rally"><img src="//a57.foxnews.com/rally.jpg"></a></div>
            <div class="info">
              <span class="pill-text"> Markets </span>
              <h3 class="title"><a href="/markets/stocks-rally">Stocks rally</a></h3>
              <p class="dek">Dow climbs 300 points.</p>
              <time class="time">October 19, 2026 9:30am</time>
            </div>
          </article>
        </div>
    </body></html>"#;

    const ARTICLE: &str = r#"<html><head><link rel="stylesheet" href="/fb.css"></head><body>
        <div class="article-body"><p>Stocks rallied on Monday.</p><div class="ad"></div></div>
    </body></html>"#;

    #[tokio::test]
    async fn test_markets_river() {
        let mut profile = profile();
        profile.categories = categories(&[("Markets", "markets")]);
        let fetcher = StaticFetcher::new()
            .page("https://www.foxbusiness.com/markets", RIVER)
            .page("https://www.foxbusiness.com/markets/stocks-rally", ARTICLE);
        let mut store = MemoryStore::new();

        scrape(&profile, &fetcher, &mut store).await.unwrap();
        let stored = &store.posts()[0];
        assert_eq!(stored.post.title, "Stocks rally");
        assert_eq!(stored.post.description, "Dow climbs 300 points.");
        assert_eq!(stored.post.thumbnail.as_deref(), Some("https://a57.foxnews.com/rally.jpg"));
        assert_eq!(stored.post.image, stored.post.thumbnail);
        assert_eq!(stored.post.timestamp, Some(Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()));
        assert_eq!(stored.tags, vec!["Markets"]);
        assert!(stored.post.body.contains(r#"href="/fb.css""#));
        assert!(!stored.post.body.contains(r#"class="ad""#));
    }

    #[tokio::test]
    async fn test_description_is_the_dek_paragraph() {
        let mut profile = profile();
        profile.categories = categories(&[("Markets", "markets")]);
        let river = RIVER.replace(
            r#"<span class="pill-text">"#,
            r#"<span class="dek">Sponsored</span><span class="pill-text">"#,
        );
        let fetcher = StaticFetcher::new()
            .page("https://www.foxbusiness.com/markets", &river)
            .page("https://www.foxbusiness.com/markets/stocks-rally", ARTICLE);
        let mut store = MemoryStore::new();

        scrape(&profile, &fetcher, &mut store).await.unwrap();
        assert_eq!(store.posts()[0].post.description, "Dow climbs 300 points.");
    }
}
