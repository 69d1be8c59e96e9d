//! Page addressing for category listings.
//!
//! Most sites address page N with a URL. One kind of site (ASP.NET
//! WebForms) only pages forward by posting back the hidden form fields of
//! the previous response. That state lives in a [`PagerState`] which the
//! category loop owns and threads through [`Pagination::fetch_page`]; it
//! starts empty for every category and is dropped when the category ends.

use crate::error::ScrapeError;
use crate::http::HttpFetch;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How listing page N of a category is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pagination {
    /// Every index maps to the category URL itself.
    #[default]
    Single,
    /// The last path segment equal to `placeholder` is replaced by the index.
    PathSegment { placeholder: String },
    /// `param=(index - 1) * step` is appended to the query string.
    Offset { param: String, step: u32 },
    /// Page 1 is a GET; page N posts the hidden fields captured from page N-1.
    Postback {
        event_target: String,
        hidden_fields: Vec<String>,
    },
}

/// Hidden form tokens captured from the last page of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerState {
    tokens: Vec<(String, String)>,
}

impl PagerState {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[(String, String)] {
        &self.tokens
    }
}

impl Pagination {
    /// URL of page `index` (1-based) for URL-addressed schemes.
    pub fn page_url(&self, category_url: &str, index: u32) -> String {
        match self {
            Pagination::Single | Pagination::Postback { .. } => category_url.to_string(),
            Pagination::PathSegment { placeholder } => {
                match category_url.strip_suffix(placeholder.as_str()) {
                    Some(prefix) if prefix.ends_with('/') => format!("{prefix}{index}"),
                    _ => category_url.to_string(),
                }
            }
            Pagination::Offset { param, step } => {
                let sep = if category_url.contains('?') { '&' } else { '?' };
                let offset = index.saturating_sub(1) as u64 * *step as u64;
                format!("{category_url}{sep}{param}={offset}")
            }
        }
    }

    /// Fetch page `index`, returning its body and the state for page `index + 1`.
    pub async fn fetch_page<F: HttpFetch>(
        &self,
        fetcher: &F,
        category_url: &str,
        index: u32,
        state: &PagerState,
    ) -> Result<(Vec<u8>, PagerState), ScrapeError> {
        let Pagination::Postback {
            event_target,
            hidden_fields,
        } = self
        else {
            let body = fetcher.get(&self.page_url(category_url, index)).await?;
            return Ok((body, PagerState::default()));
        };

        let body = if index <= 1 {
            fetcher.get(category_url).await?
        } else {
            if state.is_empty() {
                return Err(ScrapeError::structure(format!(
                    "cannot post back to page {index}: previous page left no form tokens"
                )));
            }
            let mut form = state.tokens.clone();
            form.push(("__EVENTTARGET".to_string(), event_target.clone()));
            form.push(("__EVENTARGUMENT".to_string(), index.to_string()));
            fetcher.post_form(category_url, &form).await?
        };

        let page = Html::parse_document(&String::from_utf8_lossy(&body));
        let next = capture_hidden_fields(&page, hidden_fields)?;
        debug!(index, tokens = next.tokens.len(), "captured postback tokens");
        Ok((body, next))
    }
}

/// Values of `<input type="hidden" id=NAME>` for every requested name.
fn capture_hidden_fields(page: &Html, names: &[String]) -> Result<PagerState, ScrapeError> {
    let hidden: Vec<ElementRef<'_>> = page
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "input" && el.value().attr("type") == Some("hidden"))
        .collect();

    let tokens = names
        .iter()
        .map(|name| {
            hidden
                .iter()
                .find(|el| el.value().id() == Some(name.as_str()))
                .and_then(|el| el.value().attr("value"))
                .map(|value| (name.clone(), value.to_string()))
                .ok_or_else(|| ScrapeError::structure(format!("hidden field {name} missing from page")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PagerState { tokens })
}
