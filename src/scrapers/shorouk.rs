//! [Shorouk News](https://www.shorouknews.com), Egyptian Arabic daily.
//!
//! An ASP.NET WebForms site: the section URL never changes, and page N is
//! reached by posting back the hidden form fields of page N-1 with the pager
//! as event target. Titles sit in an anchor nested inside `div.text`.

use super::categories;
use crate::extract::Descriptor;
use crate::extract::tree::{TreeLayout, TreeTags};
use crate::pagination::Pagination;
use crate::profile::{CategoryUrl, Layout, SiteProfile};
use std::collections::BTreeMap;

/// Source identity, as stored by earlier runs.
pub const TITLE: &str = "الشروق";

pub const PAGER_EVENT_TARGET: &str = "ctl00$ctl00$Body$Body$AspNetPager";

pub fn profile() -> SiteProfile {
    let mut layout = TreeLayout::new(
        Descriptor::new("ul", "class", "listing"),
        Descriptor::tag("li"),
        Descriptor::new("div", "class", "text"),
    );
    layout.title_anchor = true;
    layout.image = Descriptor::new("img", "id", "Body_Body_imageMain");
    layout.timestamp = Descriptor::tag("span");
    layout.tags = TreeTags::DetailAnchors {
        container: Descriptor::new("div", "class", "relatedWords"),
    };

    SiteProfile {
        title: TITLE.to_string(),
        base_url: "https://www.shorouknews.com".to_string(),
        categories: categories(&[
            ("Egypt", "egypt"),
            ("Politics", "Politics"),
            ("Sports", "sports"),
            ("Art", "art"),
            ("Money", "Economy"),
            ("Technology", "variety/Internet-Comm"),
            ("Science", "variety/sciences"),
            ("Health", "variety/health"),
        ]),
        category_url: CategoryUrl::Join,
        pagination: Pagination::Postback {
            event_target: PAGER_EVENT_TARGET.to_string(),
            hidden_fields: vec![
                "__VIEWSTATE".to_string(),
                "__VIEWSTATEGENERATOR".to_string(),
                "__EVENTVALIDATION".to_string(),
            ],
        },
        layout: Layout::Tree(layout),
        body: Descriptor::new("div", "class", "eventContent eventContentNone"),
        body_exclude: Vec::new(),
        fetch_detail: true,
        request_delay_ms: 0,
        max_pages: 2,
        max_pages_by_category: BTreeMap::new(),
        timezone: Some("Africa/Cairo".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::orchestrator::scrape;
    use crate::store::MemoryStore;

    const DETAIL: &str = r#"<html><body>
        <img id="Body_Body_imageMain" src="/uploadedimages/Sections/Egypt/main.jpg">
        <div class="eventContent eventContentNone"><p>نص الخبر</p><br></div>
        <div class="relatedWords"><a>مصر</a><a>القاهرة</a><a>مصر</a></div>
    </body></html>"#;

    fn listing(viewstate: &str, story: &str) -> String {
        format!(
            r#"<html><body><form>
            <input type="hidden" id="__VIEWSTATE" value="{viewstate}">
            <input type="hidden" id="__VIEWSTATEGENERATOR" value="CA0B0334">
            <input type="hidden" id="__EVENTVALIDATION" value="ev-{viewstate}">
            <ul class="listing"><li>
                <a href="/news/view.aspx?cdate={story}"><img src="http://img.shorouknews.com/{story}.jpg"></a>
                <div class="text"><span>١٩ أكتوبر ٢٠٢٦ - ١٠:٠٠ ص</span><h3><a href="/news/view.aspx?cdate={story}">عنوان {story}</a></h3></div>
                <p>ملخص</p>
            </li></ul></form></body></html>"#
        )
    }

    #[tokio::test]
    async fn test_egypt_section_over_two_postback_pages() {
        let mut profile = profile();
        profile.categories = categories(&[("Egypt", "egypt")]);
        let section = "https://www.shorouknews.com/egypt";
        let fetcher = StaticFetcher::new()
            .page(section, &listing("one", "1"))
            .post(section, &listing("two", "2"))
            .page("https://www.shorouknews.com/news/view.aspx?cdate=1", DETAIL)
            .page("https://www.shorouknews.com/news/view.aspx?cdate=2", DETAIL);
        let mut store = MemoryStore::new();

        let report = scrape(&profile, &fetcher, &mut store).await.unwrap();
        assert_eq!(report.saved_count(), 2);
        assert_eq!(report.source, "الشروق");
        assert_eq!(store.snapshot().sources[0].title, "الشروق");

        let first = &store.posts()[0];
        assert_eq!(first.post.title, "عنوان 1");
        assert_eq!(
            first.post.image.as_deref(),
            Some("https://www.shorouknews.com/uploadedimages/Sections/Egypt/main.jpg")
        );
        assert_eq!(first.tags, vec!["مصر", "القاهرة"]);
        assert!(first.post.body.contains("نص الخبر"));
        assert!(!first.post.body.contains("<br>"));
        assert!(first.post.timestamp.is_some());
    }

    #[test]
    fn test_main_image_must_be_an_img() {
        let Layout::Tree(layout) = profile().layout else {
            panic!("expected a tree layout");
        };
        let doc = scraper::Html::parse_document(
            r#"<div id="Body_Body_imageMain" class="frame"></div><img id="Body_Body_imageMain" src="/main.jpg">"#,
        );
        let found = layout.image.find(doc.root_element()).unwrap();
        assert_eq!(found.value().name(), "img");
    }
}
