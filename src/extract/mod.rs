//! Declarative field extraction.
//!
//! A site profile never contains traversal code. It describes where each
//! field lives, and one of two [`DocumentAdapter`] implementations walks
//! the document:
//!
//! | Adapter | Document | Descriptor |
//! |---------|----------|------------|
//! | [`TreeAdapter`] | parsed HTML | [`Descriptor`] (tag, attribute, value prefix) |
//! | [`KeyedAdapter`] | JSON value | dotted key path |
//!
//! Missing optional fields come back as empty strings. A missing list
//! container or an empty item list is a [`ScrapeError::Structure`]: it means
//! the site layout changed and the page should be abandoned, not read as
//! "zero posts".

pub mod keyed;
pub mod tree;

pub use keyed::KeyedAdapter;
pub use tree::TreeAdapter;

use crate::error::ScrapeError;
use crate::http::HttpFetch;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locates an element in a markup tree.
///
/// An element matches when its tag equals `tag` (any tag if empty) and, when
/// both `attr` and `prefix` are set, the attribute value starts with
/// `prefix`. For `class`, each individual class name is also tried, so
/// `article` matches `class="story article-big"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub tag: String,
    pub attr: String,
    pub prefix: String,
}

impl Descriptor {
    pub fn new(tag: &str, attr: &str, prefix: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr: attr.to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Match on tag name only.
    pub fn tag(tag: &str) -> Self {
        Self::new(tag, "", "")
    }

    /// A default descriptor names nothing and is treated as "field absent".
    pub fn is_unset(&self) -> bool {
        self.tag.is_empty() && (self.attr.is_empty() || self.prefix.is_empty())
    }

    pub fn matches(&self, el: ElementRef<'_>) -> bool {
        let element = el.value();
        if !self.tag.is_empty() && element.name() != self.tag {
            return false;
        }
        if self.attr.is_empty() || self.prefix.is_empty() {
            return true;
        }
        match element.attr(&self.attr) {
            Some(value) if value.starts_with(&self.prefix) => true,
            Some(_) if self.attr == "class" => element.classes().any(|c| c.starts_with(&self.prefix)),
            _ => false,
        }
    }

    /// First matching descendant of `scope`, in document order.
    pub fn find<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| self.matches(*el))
    }

    /// All matching descendants of `scope`, in document order.
    pub fn find_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        scope
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| self.matches(*el))
            .collect()
    }

    /// All matching elements of a whole document, the root element included.
    pub fn find_in_document<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| self.matches(*el))
            .collect()
    }

    /// First matching element of a whole document.
    pub fn find_first_in_document<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| self.matches(*el))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.tag.is_empty() { "*" } else { &self.tag };
        if self.attr.is_empty() || self.prefix.is_empty() {
            write!(f, "<{tag}>")
        } else {
            write!(f, "<{tag} {}^=\"{}\">", self.attr, self.prefix)
        }
    }
}

/// Scalar fields every adapter can extract from one listing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    /// Absolute detail URL.
    Url,
    Description,
    /// Absolute https thumbnail URL, or empty.
    Thumbnail,
    /// Absolute https image URL from the detail page, or empty.
    Image,
    /// Raw timestamp text, not yet normalized.
    Timestamp,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Title,
        FieldKind::Url,
        FieldKind::Description,
        FieldKind::Thumbnail,
        FieldKind::Image,
        FieldKind::Timestamp,
    ];
}

/// Identical extraction contract over two document shapes.
///
/// The orchestrator is generic over this trait and never looks at the
/// concrete document type.
pub trait DocumentAdapter {
    /// Parsed listing page.
    type Document;
    /// A borrowed container or item inside a [`Self::Document`].
    type Node<'d>: Copy;

    fn parse(&self, body: &[u8]) -> Result<Self::Document, ScrapeError>;

    /// Containers that hold the listing items. Never empty on success.
    fn list_containers<'d>(&self, page: &'d Self::Document) -> Result<Vec<Self::Node<'d>>, ScrapeError>;

    /// Items inside one list container, in document order.
    fn item_containers<'d>(&self, list: Self::Node<'d>) -> Result<Vec<Self::Node<'d>>, ScrapeError>;

    /// One scalar field. `detail` is the article page when it was fetched.
    fn field(&self, item: Self::Node<'_>, detail: Option<&Html>, kind: FieldKind) -> Result<String, ScrapeError>;

    /// Raw tag names, not yet normalized or deduplicated.
    fn tag_names(&self, item: Self::Node<'_>, detail: Option<&Html>) -> Vec<String>;
}

/// Fetch and parse the article page behind a listing item.
pub async fn detail_document<F: HttpFetch>(fetcher: &F, url: &str) -> Result<Html, ScrapeError> {
    let body = fetcher.get(url).await?;
    Ok(Html::parse_document(&String::from_utf8_lossy(&body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;

    fn doc() -> Html {
        Html::parse_document(
            r#"<html><body>
                <div class="collection collection-river content">
                    <article class="story article-big"><h3 class="title">One</h3></article>
                    <article class="article"><h3 class="title-x">Two</h3></article>
                    <section class="article"><h3>Three</h3></section>
                </div>
            </body></html>"#,
        )
    }

    #[test]
    fn test_descriptor_prefix_matches_full_class_string() {
        let html = doc();
        let d = Descriptor::new("div", "class", "collection collection-river");
        assert_eq!(d.find_in_document(&html).len(), 1);
    }

    #[test]
    fn test_descriptor_prefix_matches_single_class() {
        let html = doc();
        let d = Descriptor::new("article", "class", "article");
        let found = d.find_in_document(&html);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_descriptor_empty_tag_matches_any_element() {
        let html = doc();
        let d = Descriptor::new("", "class", "article");
        assert_eq!(d.find_in_document(&html).len(), 3);
    }

    #[test]
    fn test_descriptor_attr_without_prefix_is_unconstrained() {
        let html = doc();
        let d = Descriptor::new("h3", "class", "");
        assert_eq!(d.find_in_document(&html).len(), 3);
    }

    #[test]
    fn test_find_skips_scope_itself() {
        let html = doc();
        let list = Descriptor::tag("article").find_first_in_document(&html).unwrap();
        assert!(Descriptor::tag("article").find(list).is_none());
        let title = Descriptor::new("h3", "class", "title").find(list).unwrap();
        assert_eq!(title.text().collect::<String>(), "One");
    }

    #[test]
    fn test_unset_descriptor() {
        assert!(Descriptor::default().is_unset());
        assert!(!Descriptor::tag("time").is_unset());
        assert!(!Descriptor::new("", "id", "paging").is_unset());
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(Descriptor::tag("img").to_string(), "<img>");
        assert_eq!(Descriptor::new("", "id", "paging").to_string(), "<* id^=\"paging\">");
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let d: Descriptor = serde_yaml::from_str("tag: span").unwrap();
        assert_eq!(d, Descriptor::tag("span"));
    }

    #[tokio::test]
    async fn test_detail_document_fetches_and_parses() {
        let fetcher = StaticFetcher::new().page("https://a.com/x", "<p id='x'>hi</p>");
        let html = detail_document(&fetcher, "https://a.com/x").await.unwrap();
        let p = Descriptor::new("p", "id", "x").find_first_in_document(&html).unwrap();
        assert_eq!(p.text().collect::<String>(), "hi");

        let err = detail_document(&fetcher, "https://a.com/gone").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Fetch);
    }
}
