//! Site profiles: the declarative binding of one news site to the engine.
//!
//! A profile is plain data. It can be built in Rust (see [`crate::scrapers`])
//! or loaded from YAML with [`load_profiles`]. Site quirks are expressed as
//! enum variants and optional descriptors instead of code:
//!
//! ```yaml
//! - title: Fox Business
//!   base_url: https://www.foxbusiness.com
//!   categories: { Money: money, Markets: markets }
//!   max_pages: 1
//!   timezone: UTC
//!   body: { tag: div, attr: class, prefix: article-body }
//!   layout:
//!     kind: tree
//!     list_container: { tag: div, attr: class, prefix: collection collection-river }
//!     item_container: { tag: article, attr: class, prefix: article }
//!     title: { tag: h3, attr: class, prefix: title }
//! ```

use crate::error::ScrapeError;
use crate::extract::keyed::KeyedLayout;
use crate::extract::tree::TreeLayout;
use crate::extract::Descriptor;
use crate::pagination::Pagination;
use crate::utils::absolute_url;
use chrono_tz::Tz;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Document shape of a site's listing pages, chosen once per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    Tree(TreeLayout),
    Keyed(KeyedLayout),
}

/// How a category key becomes a listing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryUrl {
    /// Join the category path onto the base URL.
    #[default]
    Join,
    /// Join `template` onto the base URL after replacing `{category}` with
    /// the URL-encoded category path.
    Query { template: String },
}

fn default_max_pages() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Display title; also the source identity.
    pub title: String,
    pub base_url: String,
    /// Category title → site-specific path or key.
    pub categories: BTreeMap<String, String>,
    #[serde(default)]
    pub category_url: CategoryUrl,
    #[serde(default)]
    pub pagination: Pagination,
    pub layout: Layout,
    /// Article body container on the detail page.
    #[serde(default)]
    pub body: Descriptor,
    /// CSS selectors removed from the body before sanitizing.
    #[serde(default)]
    pub body_exclude: Vec<String>,
    /// Fetch the article page for every new item.
    #[serde(default = "default_true")]
    pub fetch_detail: bool,
    /// Wait before every request to this site.
    #[serde(default)]
    pub request_delay_ms: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Per-category override of `max_pages`.
    #[serde(default)]
    pub max_pages_by_category: BTreeMap<String, u32>,
    /// IANA zone (or abbreviation known to the tz database) of naive timestamps.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl SiteProfile {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn max_pages_for(&self, category: &str) -> u32 {
        self.max_pages_by_category
            .get(category)
            .copied()
            .unwrap_or(self.max_pages)
    }

    pub fn timezone(&self) -> Result<Option<Tz>, ScrapeError> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| ScrapeError::Config(format!("{}: unknown timezone {name}", self.title)))
            })
            .transpose()
    }

    /// Absolute listing URL for a category.
    pub fn category_url(&self, category: &str) -> Result<String, ScrapeError> {
        let path = self
            .categories
            .get(category)
            .ok_or_else(|| ScrapeError::Config(format!("{}: unknown category {category}", self.title)))?;
        match &self.category_url {
            CategoryUrl::Join => absolute_url(&self.base_url, path),
            CategoryUrl::Query { template } => {
                let relative = template.replace("{category}", &urlencoding::encode(path));
                absolute_url(&self.base_url, &relative)
            }
        }
    }

    /// Reject profiles the engine could not run.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let fail = |msg: String| Err(ScrapeError::Config(format!("{}: {msg}", self.title)));
        if self.title.trim().is_empty() {
            return Err(ScrapeError::Config("profile without a title".to_string()));
        }
        if Url::parse(&self.base_url).is_err() {
            return fail(format!("base_url {} is not absolute", self.base_url));
        }
        if self.categories.is_empty() {
            return fail("no categories".to_string());
        }
        if self.max_pages == 0 || self.max_pages_by_category.values().any(|&n| n == 0) {
            return fail("max_pages must be at least 1".to_string());
        }
        if let Some(css) = self.body_exclude.iter().find(|css| Selector::parse(css).is_err()) {
            return fail(format!("invalid body_exclude selector {css}"));
        }
        if let CategoryUrl::Query { template } = &self.category_url {
            if !template.contains("{category}") {
                return fail("category_url template lacks {category}".to_string());
            }
        }
        self.timezone()?;
        for category in self.categories.keys() {
            self.category_url(category)?;
        }
        Ok(())
    }
}

/// Parse and validate a YAML list of profiles.
pub fn parse_profiles(yaml: &str) -> Result<Vec<SiteProfile>, ScrapeError> {
    let profiles: Vec<SiteProfile> =
        serde_yaml::from_str(yaml).map_err(|e| ScrapeError::Config(format!("profiles YAML: {e}")))?;
    for profile in &profiles {
        profile.validate()?;
    }
    Ok(profiles)
}

/// Load site profiles from a YAML file.
#[instrument(level = "info")]
pub async fn load_profiles(path: &str) -> Result<Vec<SiteProfile>, ScrapeError> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let profiles = parse_profiles(&yaml)?;
    info!(count = profiles.len(), "Loaded site profiles");
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
- title: Fox Business
  base_url: https://www.foxbusiness.com
  categories: { Money: money, Markets: markets }
  max_pages: 1
  timezone: UTC
  body: { tag: div, attr: class, prefix: article-body }
  layout:
    kind: tree
    list_container: { tag: div, attr: class, prefix: collection collection-river }
    item_container: { tag: article, attr: class, prefix: article }
    title: { tag: h3, attr: class, prefix: title }
    tags:
      kind: item_text
      element: { tag: span, attr: class, prefix: pill-text }
- title: Example API
  base_url: https://api.example.com
  categories: { World: world news }
  category_url:
    kind: query
    template: "search?section={category}&size=30"
  pagination: { kind: offset, param: offset, step: 30 }
  layout:
    kind: keyed
    title: headline
    url: link
"#;

    #[test]
    fn test_parse_profiles_from_yaml() {
        let profiles = parse_profiles(YAML).unwrap();
        assert_eq!(profiles.len(), 2);

        let fox = &profiles[0];
        assert_eq!(fox.max_pages_for("Money"), 1);
        assert!(fox.fetch_detail);
        assert_eq!(fox.timezone().unwrap(), Some(chrono_tz::UTC));
        assert_eq!(fox.category_url("Markets").unwrap(), "https://www.foxbusiness.com/markets");
        let Layout::Tree(tree) = &fox.layout else {
            panic!("expected a tree layout");
        };
        assert_eq!(tree.url, Descriptor::tag("a"));

        let api = &profiles[1];
        assert_eq!(api.max_pages, 2);
        assert_eq!(api.timezone().unwrap(), None);
        assert_eq!(
            api.category_url("World").unwrap(),
            "https://api.example.com/search?section=world%20news&size=30"
        );
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut profile = parse_profiles(YAML).unwrap().remove(0);
        profile.timezone = Some("Mars/Olympus".to_string());
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("unknown timezone"));
    }

    #[test]
    fn test_validate_rejects_zero_pages_and_bad_selector() {
        let mut profile = parse_profiles(YAML).unwrap().remove(0);
        profile.max_pages_by_category.insert("Money".to_string(), 0);
        assert!(profile.validate().is_err());

        let mut profile = parse_profiles(YAML).unwrap().remove(0);
        profile.body_exclude = vec!["div[".to_string()];
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_unknown_category_is_config_error() {
        let profile = parse_profiles(YAML).unwrap().remove(0);
        let err = profile.category_url("Weather").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_per_category_page_cap() {
        let mut profile = parse_profiles(YAML).unwrap().remove(0);
        profile.max_pages_by_category.insert("Markets".to_string(), 2);
        assert_eq!(profile.max_pages_for("Markets"), 2);
        assert_eq!(profile.max_pages_for("Money"), 1);
    }

    #[tokio::test]
    async fn test_load_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.yaml");
        std::fs::write(&path, YAML).unwrap();
        let profiles = load_profiles(path.to_str().unwrap()).await.unwrap();
        assert_eq!(profiles[1].title, "Example API");
    }
}
