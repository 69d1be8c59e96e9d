//! [Youm7](https://www.youm7.com), Egyptian Arabic daily.
//!
//! Section pages end in a placeholder segment (`/x`) that is replaced by the
//! page number. The lead image sits in `div.img-cont`; the page also carries
//! other `img-responsive` images (logos, related stories) outside it.

use super::categories;
use crate::extract::Descriptor;
use crate::extract::tree::{TreeLayout, TreeTags};
use crate::pagination::Pagination;
use crate::profile::{CategoryUrl, Layout, SiteProfile};
use std::collections::BTreeMap;

/// Source identity, as stored by earlier runs.
pub const TITLE: &str = "اليوم السابع";

pub fn profile() -> SiteProfile {
    let mut layout = TreeLayout::new(
        Descriptor::new("div", "id", "paging"),
        Descriptor::new("div", "class", "col-xs-12 bigOneSec"),
        Descriptor::tag("h3"),
    );
    layout.image = Descriptor::new("img", "class", "img-responsive");
    layout.image_scope = Some(Descriptor::new("div", "class", "img-cont"));
    layout.timestamp = Descriptor::new("span", "class", "newsDate");
    layout.tags = TreeTags::DetailAnchors {
        container: Descriptor::new("div", "class", "tags"),
    };

    SiteProfile {
        title: TITLE.to_string(),
        base_url: "https://www.youm7.com".to_string(),
        categories: categories(&[
            ("Breaking", "Section/أخبار-عاجلة/65/x"),
            ("Politics", "Section/سياسة/319/x"),
            ("Reports", "Section/تقارير-مصرية/97/x"),
            ("Accidents", "Section/حوادث/203/x"),
            ("Sports", "Section/أخبار-الرياضة/298/x"),
            ("Football", "Section/كرة-عالمية/332/x"),
            ("Global", "Section/أخبار-عالمية/286/x"),
            ("Health", "Section/صحة-وطب/245/x"),
            ("Technology", "Section/علوم-و-تكنولوجيا/328/x"),
            ("Egypt", "Section/أخبار-المحافظات/296/x"),
        ]),
        category_url: CategoryUrl::Join,
        pagination: Pagination::PathSegment {
            placeholder: "x".to_string(),
        },
        layout: Layout::Tree(layout),
        body: Descriptor::new("div", "id", "articleBody"),
        body_exclude: Vec::new(),
        fetch_detail: true,
        request_delay_ms: 0,
        max_pages: 2,
        max_pages_by_category: BTreeMap::new(),
        timezone: Some("Africa/Cairo".to_string()),
    }
}
