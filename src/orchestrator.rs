//! Category → page → item traversal shared by every site.
//!
//! For each configured category the orchestrator walks listing pages in
//! ascending order, extracts every item in document order and persists the
//! new ones one by one. A category stops at the first item the store already
//! knows (the site lists newest first, so everything after it is known too),
//! at the first empty page, or when the page cap is reached.
//!
//! Recovery policy:
//! - item-level failures (missing title or link, failed detail fetch) are
//!   logged and the item is skipped
//! - page-level failures (fetch error, missing containers, unparseable body)
//!   are logged and the loop advances to the next page index
//! - store failures abort the site run; [`crate::run_all_sources`] keeps
//!   other sites running

use crate::error::{ErrorKind, ScrapeError};
use crate::extract::{DocumentAdapter, FieldKind, KeyedAdapter, TreeAdapter, detail_document};
use crate::http::{HttpFetch, Paced};
use crate::models::{Category, PostCandidate, Source, distinct_tag_names};
use crate::pagination::PagerState;
use crate::profile::{Layout, SiteProfile};
use crate::sanitize::format_body;
use crate::store::PostStore;
use crate::timestamp;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Why a category's traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// An already-stored item was reached.
    DuplicateBoundary,
    /// The page cap was reached or a page listed no items.
    Exhausted,
    /// The category URL could not be built; nothing was fetched.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: String,
    /// Detail URLs of the saved posts, in save order.
    pub saved: Vec<String>,
    pub skipped_items: usize,
    pub failed_pages: usize,
    pub stop: StopReason,
}

impl CategoryReport {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            saved: Vec::new(),
            skipped_items: 0,
            failed_pages: 0,
            stop: StopReason::Exhausted,
        }
    }
}

/// Outcome of one [`scrape`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub source: String,
    pub categories: Vec<CategoryReport>,
}

impl ScrapeReport {
    pub fn saved_count(&self) -> usize {
        self.categories.iter().map(|c| c.saved.len()).sum()
    }
}

enum PageOutcome {
    Continue,
    Empty,
    Boundary,
}

enum ItemOutcome {
    Saved(String),
    Known(String),
}

/// Scrape every category of one site and persist the new posts.
///
/// The document shape is selected here, once, from the profile's layout.
#[instrument(level = "info", skip_all, fields(source = %profile.title))]
pub async fn scrape<F, S>(profile: &SiteProfile, fetcher: &F, store: &mut S) -> Result<ScrapeReport, ScrapeError>
where
    F: HttpFetch,
    S: PostStore,
{
    let timezone = profile.timezone()?;
    let fetcher = Paced::new(fetcher, profile.request_delay());
    let now = Utc::now();
    match &profile.layout {
        Layout::Tree(layout) => {
            let adapter = TreeAdapter::new(layout, &profile.base_url);
            Orchestrator::new(profile, adapter, &fetcher, timezone, now).run(store).await
        }
        Layout::Keyed(layout) => {
            let adapter = KeyedAdapter::new(layout, &profile.base_url);
            Orchestrator::new(profile, adapter, &fetcher, timezone, now).run(store).await
        }
    }
}

struct Orchestrator<'p, A, F> {
    profile: &'p SiteProfile,
    adapter: A,
    fetcher: &'p F,
    timezone: Option<Tz>,
    now: DateTime<Utc>,
}

impl<'p, A, F> Orchestrator<'p, A, F>
where
    A: DocumentAdapter,
    F: HttpFetch,
{
    fn new(profile: &'p SiteProfile, adapter: A, fetcher: &'p F, timezone: Option<Tz>, now: DateTime<Utc>) -> Self {
        Self {
            profile,
            adapter,
            fetcher,
            timezone,
            now,
        }
    }

    async fn run<S: PostStore>(&self, store: &mut S) -> Result<ScrapeReport, ScrapeError> {
        let profile = self.profile;
        let mut report = ScrapeReport {
            source: profile.title.clone(),
            categories: Vec::new(),
        };
        let mut resolved_source: Option<Source> = None;

        for title in profile.categories.keys() {
            let category_url = match profile.category_url(title) {
                Ok(url) => url,
                Err(e) => {
                    warn!(source = %profile.title, category = %title, error = %e, "Cannot resolve category URL");
                    let mut unresolved = CategoryReport::new(title);
                    unresolved.stop = StopReason::Unresolved;
                    report.categories.push(unresolved);
                    continue;
                }
            };

            let source = match resolved_source.clone() {
                Some(source) => source,
                None => {
                    let source = store.get_or_create_source(&profile.title, &profile.base_url).await?;
                    resolved_source = Some(source.clone());
                    source
                }
            };
            let category = store.get_or_create_category(title).await?;

            let outcome = self.scrape_category(store, &source, &category, &category_url).await?;
            info!(
                source = %source.title,
                category = %category.title,
                saved = outcome.saved.len(),
                skipped = outcome.skipped_items,
                failed_pages = outcome.failed_pages,
                stop = ?outcome.stop,
                "Category done"
            );
            report.categories.push(outcome);
        }
        Ok(report)
    }

    async fn scrape_category<S: PostStore>(
        &self,
        store: &mut S,
        source: &Source,
        category: &Category,
        category_url: &str,
    ) -> Result<CategoryReport, ScrapeError> {
        let mut report = CategoryReport::new(&category.title);
        let cap = self.profile.max_pages_for(&category.title);
        // Postback tokens never outlive this loop.
        let mut state = PagerState::default();

        for page in 1..=cap {
            let fetched = self
                .profile
                .pagination
                .fetch_page(self.fetcher, category_url, page, &state)
                .await;
            let body = match fetched {
                Ok((body, next)) => {
                    state = next;
                    body
                }
                Err(e) => {
                    warn!(source = %source.title, category = %category.title, page, error = %e, "Listing page failed, advancing");
                    report.failed_pages += 1;
                    continue;
                }
            };

            match self.scrape_page(store, source, category, page, &body, &mut report).await {
                Ok(PageOutcome::Continue) => {}
                Ok(PageOutcome::Boundary) => {
                    report.stop = StopReason::DuplicateBoundary;
                    return Ok(report);
                }
                Ok(PageOutcome::Empty) => {
                    debug!(source = %source.title, category = %category.title, page, "Listing page has no items");
                    break;
                }
                Err(e) if e.kind() == ErrorKind::Store => return Err(e),
                Err(e) => {
                    warn!(source = %source.title, category = %category.title, page, error = %e, "Listing page unusable, advancing");
                    report.failed_pages += 1;
                }
            }
        }
        report.stop = StopReason::Exhausted;
        Ok(report)
    }

    async fn scrape_page<S: PostStore>(
        &self,
        store: &mut S,
        source: &Source,
        category: &Category,
        page: u32,
        body: &[u8],
        report: &mut CategoryReport,
    ) -> Result<PageOutcome, ScrapeError> {
        let document = self.adapter.parse(body)?;
        let mut items = Vec::new();
        for list in self.adapter.list_containers(&document)? {
            items.extend(self.adapter.item_containers(list)?);
        }
        if items.is_empty() {
            return Ok(PageOutcome::Empty);
        }

        for (index, item) in items.into_iter().enumerate() {
            match self.scrape_item(store, source, category, item).await {
                Ok(ItemOutcome::Saved(url)) => {
                    debug!(source = %source.title, category = %category.title, page, item = index + 1, %url, "Saved post");
                    report.saved.push(url);
                }
                Ok(ItemOutcome::Known(url)) => {
                    info!(source = %source.title, category = %category.title, page, item = index + 1, %url, "Reached known post");
                    return Ok(PageOutcome::Boundary);
                }
                Err(e) if e.kind() == ErrorKind::Store => return Err(e),
                Err(e) => {
                    warn!(source = %source.title, category = %category.title, page, item = index + 1, error = %e, "Skipping item");
                    report.skipped_items += 1;
                }
            }
        }
        Ok(PageOutcome::Continue)
    }

    async fn scrape_item<S: PostStore>(
        &self,
        store: &mut S,
        source: &Source,
        category: &Category,
        item: A::Node<'_>,
    ) -> Result<ItemOutcome, ScrapeError> {
        let title = self.adapter.field(item, None, FieldKind::Title)?;
        if title.is_empty() {
            return Err(ScrapeError::structure("item has no title"));
        }
        let detail_url = self.adapter.field(item, None, FieldKind::Url)?;
        if store.exists_post(source, category, &detail_url).await? {
            return Ok(ItemOutcome::Known(detail_url));
        }

        let detail = if self.profile.fetch_detail {
            Some(detail_document(self.fetcher, &detail_url).await?)
        } else {
            None
        };
        let detail = detail.as_ref();

        let thumbnail = non_empty(self.adapter.field(item, detail, FieldKind::Thumbnail)?);
        let image = non_empty(self.adapter.field(item, detail, FieldKind::Image)?).or_else(|| thumbnail.clone());
        let raw_timestamp = self.adapter.field(item, detail, FieldKind::Timestamp)?;
        let body = detail
            .map(|page| format_body(page, &self.profile.body, &self.profile.body_exclude))
            .unwrap_or_default();

        let mut tags = Vec::new();
        for name in distinct_tag_names(self.adapter.tag_names(item, detail)) {
            tags.push(store.get_or_create_tag(&name).await?);
        }

        let post = PostCandidate {
            source: source.clone(),
            category: category.clone(),
            title,
            detail_url: detail_url.clone(),
            description: self.adapter.field(item, detail, FieldKind::Description)?,
            thumbnail,
            image,
            body,
            timestamp: timestamp::normalize(Some(&raw_timestamp), self.timezone, self.now),
        };
        store.save_post(post, tags).await?;
        Ok(ItemOutcome::Saved(detail_url))
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
