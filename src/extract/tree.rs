//! Extraction over server-rendered HTML listings.

use super::{Descriptor, DocumentAdapter, FieldKind};
use crate::error::ScrapeError;
use crate::utils::{absolute_image_url, absolute_url};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// Where tags live for an HTML site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeTags {
    #[default]
    None,
    /// Text of every `<a>` inside the first matching container of the detail page.
    DetailAnchors { container: Descriptor },
    /// Text of the first matching element inside the listing item, as one tag.
    ItemText { element: Descriptor },
}

fn default_url() -> Descriptor {
    Descriptor::tag("a")
}

fn default_description() -> Descriptor {
    Descriptor::tag("p")
}

fn default_img() -> Descriptor {
    Descriptor::tag("img")
}

/// Field descriptors for an HTML site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub list_container: Descriptor,
    pub item_container: Descriptor,
    pub title: Descriptor,
    /// Read the title from the first `<a>` inside the title element.
    #[serde(default)]
    pub title_anchor: bool,
    #[serde(default = "default_url")]
    pub url: Descriptor,
    #[serde(default = "default_description")]
    pub description: Descriptor,
    #[serde(default = "default_img")]
    pub thumbnail: Descriptor,
    #[serde(default = "default_img")]
    pub image: Descriptor,
    /// Narrow the detail-page image lookup to this container first.
    #[serde(default)]
    pub image_scope: Option<Descriptor>,
    #[serde(default)]
    pub timestamp: Descriptor,
    #[serde(default)]
    pub tags: TreeTags,
}

impl TreeLayout {
    /// Layout with the usual defaults for url/description/images.
    pub fn new(list_container: Descriptor, item_container: Descriptor, title: Descriptor) -> Self {
        Self {
            list_container,
            item_container,
            title,
            title_anchor: false,
            url: default_url(),
            description: default_description(),
            thumbnail: default_img(),
            image: default_img(),
            image_scope: None,
            timestamp: Descriptor::default(),
            tags: TreeTags::None,
        }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// [`DocumentAdapter`] for HTML listings.
#[derive(Debug, Clone, Copy)]
pub struct TreeAdapter<'p> {
    layout: &'p TreeLayout,
    base_url: &'p str,
}

impl<'p> TreeAdapter<'p> {
    pub fn new(layout: &'p TreeLayout, base_url: &'p str) -> Self {
        Self { layout, base_url }
    }

    fn title(&self, item: ElementRef<'_>) -> String {
        let Some(el) = self.layout.title.find(item) else {
            return String::new();
        };
        if self.layout.title_anchor {
            Descriptor::tag("a").find(el).map(text_of).unwrap_or_default()
        } else {
            text_of(el)
        }
    }

    fn url(&self, item: ElementRef<'_>) -> Result<String, ScrapeError> {
        let href = self
            .layout
            .url
            .find(item)
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ScrapeError::structure(format!("item has no {} with an href", self.layout.url)))?;
        absolute_url(self.base_url, href)
    }

    fn image(&self, detail: &Html) -> String {
        let scope = match &self.layout.image_scope {
            Some(scope) => scope.find_first_in_document(detail),
            None => Some(detail.root_element()),
        };
        scope
            .and_then(|s| {
                if self.layout.image.matches(s) {
                    Some(s)
                } else {
                    self.layout.image.find(s)
                }
            })
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| absolute_image_url(self.base_url, src))
            .unwrap_or_default()
    }

    fn timestamp(&self, item: ElementRef<'_>) -> String {
        if self.layout.timestamp.is_unset() {
            return String::new();
        }
        let Some(el) = self.layout.timestamp.find(item) else {
            return String::new();
        };
        let text = text_of(el);
        if text.is_empty() {
            el.value().attr("datetime").unwrap_or_default().trim().to_string()
        } else {
            text
        }
    }
}

impl<'p> DocumentAdapter for TreeAdapter<'p> {
    type Document = Html;
    type Node<'d> = ElementRef<'d>;

    fn parse(&self, body: &[u8]) -> Result<Html, ScrapeError> {
        Ok(Html::parse_document(&String::from_utf8_lossy(body)))
    }

    fn list_containers<'d>(&self, page: &'d Html) -> Result<Vec<ElementRef<'d>>, ScrapeError> {
        let found = self.layout.list_container.find_in_document(page);
        if found.is_empty() {
            return Err(ScrapeError::structure(format!(
                "no list container {} on page",
                self.layout.list_container
            )));
        }
        Ok(found)
    }

    // Keeps `'d` early-bound like the trait, where it only appears in a projection.
    fn item_containers<'d>(&self, list: ElementRef<'d>) -> Result<Vec<ElementRef<'d>>, ScrapeError>
    where
        'd: 'd,
    {
        let found = self.layout.item_container.find_all(list);
        if found.is_empty() {
            return Err(ScrapeError::structure(format!(
                "no item container {} in list",
                self.layout.item_container
            )));
        }
        Ok(found)
    }

    fn field(&self, item: ElementRef<'_>, detail: Option<&Html>, kind: FieldKind) -> Result<String, ScrapeError> {
        Ok(match kind {
            FieldKind::Title => self.title(item),
            FieldKind::Url => self.url(item)?,
            FieldKind::Description => self.layout.description.find(item).map(text_of).unwrap_or_default(),
            FieldKind::Thumbnail => self
                .layout
                .thumbnail
                .find(item)
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| absolute_image_url(self.base_url, src))
                .unwrap_or_default(),
            FieldKind::Image => detail.map(|d| self.image(d)).unwrap_or_default(),
            FieldKind::Timestamp => self.timestamp(item),
        })
    }

    fn tag_names(&self, item: ElementRef<'_>, detail: Option<&Html>) -> Vec<String> {
        match &self.layout.tags {
            TreeTags::None => Vec::new(),
            TreeTags::ItemText { element } => element.find(item).map(text_of).into_iter().collect(),
            TreeTags::DetailAnchors { container } => detail
                .and_then(|d| container.find_first_in_document(d))
                .map(|c| Descriptor::tag("a").find_all(c).into_iter().map(text_of).collect())
                .unwrap_or_default(),
        }
    }
}
