//! Built-in site profiles.
//!
//! Each submodule binds one news site to the generic engine. They contain
//! configuration only: descriptors, category paths and the declarative
//! hooks from [`crate::profile`]. No site carries its own traversal code.
//!
//! | Source | Module | Listing | Pagination |
//! |--------|--------|---------|------------|
//! | اليوم السابع (Youm7) | [`youm7`] | HTML | page number in the last path segment |
//! | الشروق (Shorouk News) | [`shorouk`] | HTML | ASP.NET postback tokens |
//! | Fox Business | [`fox_business`] | HTML | single page |
//! | Fox News | [`fox_news`] | JSON search API | `offset` query parameter |

pub mod fox_business;
pub mod fox_news;
pub mod shorouk;
pub mod youm7;

use crate::profile::SiteProfile;
use std::collections::BTreeMap;

/// Every built-in profile, in run order.
pub fn builtin() -> Vec<SiteProfile> {
    vec![
        youm7::profile(),
        shorouk::profile(),
        fox_business::profile(),
        fox_news::profile(),
    ]
}

fn categories(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(title, path)| (title.to_string(), path.to_string()))
        .collect()
}
