//! [Fox News](https://www.foxnews.com), read through its article search API.
//!
//! The API answers a JSON array of 30 articles per request and pages with an
//! `offset` parameter. Article bodies still come from the HTML page, minus
//! the inline ad slots.

use super::categories;
use crate::extract::Descriptor;
use crate::extract::keyed::KeyedLayout;
use crate::pagination::Pagination;
use crate::profile::{CategoryUrl, Layout, SiteProfile};
use std::collections::BTreeMap;

const SEARCH: &str = "api/article-search?isCategory=true&isTag=false&isKeyword=false&isFixed=false\
&isFeedUrl=false&searchSelected={category}\
&contentTypes=%7B%22interactive%22:false,%22slideshow%22:false,%22video%22:false,%22article%22:true%7D\
&size=30";

pub fn profile() -> SiteProfile {
    SiteProfile {
        title: "Fox News".to_string(),
        base_url: "https://www.foxnews.com".to_string(),
        categories: categories(&[
            ("Us", "us"),
            ("Global", "world"),
            ("Politics", "politics"),
            ("Entertainment", "entertainment"),
        ]),
        category_url: CategoryUrl::Query {
            template: SEARCH.to_string(),
        },
        pagination: Pagination::Offset {
            param: "offset".to_string(),
            step: 30,
        },
        layout: Layout::Keyed(KeyedLayout {
            title: "title".to_string(),
            url: "url".to_string(),
            description: "description".to_string(),
            thumbnail: "imageUrl".to_string(),
            timestamp: "publicationDate".to_string(),
            tags: "category.name".to_string(),
            ..KeyedLayout::default()
        }),
        body: Descriptor::new("div", "class", "article-body"),
        body_exclude: vec![".ad-container".to_string()],
        fetch_detail: true,
        request_delay_ms: 0,
        max_pages: 2,
        max_pages_by_category: BTreeMap::new(),
        timezone: Some("UTC".to_string()),
    }
}
