//! Turn an article body subtree into a standalone, display-ready fragment.
//!
//! Steps, in order:
//! 1. drop elements matching the profile's exclusion selectors (ads)
//! 2. drop every `div`/`span`/`p` whose text is empty or whitespace, in one pass
//! 3. drop trailing `<br>` children of the body container
//! 4. pretty-print the container with one space of indentation per level
//! 5. wrap it as `<head>` (fixed style + the page's `<link>`/`<style>` tags)
//!    and `<body dir="auto">`
//!
//! Running the result through the same steps again yields the same bytes.

use crate::extract::Descriptor;
use scraper::{ElementRef, Html, Node, Selector};
use std::fmt::Write;
use tracing::warn;

/// Style block prepended to every body.
pub const RESPONSIVE_STYLE: &str =
    "<style>:not(head) { max-width: 100%; object-fit: scale-down; margin: auto; line-height: 1.8;} </style>";

const WRAPPERS: &[&str] = &["div", "span", "p"];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Find the body container on a detail page and format it. Missing body → `""`.
pub fn format_body(page: &Html, body: &Descriptor, exclude: &[String]) -> String {
    if body.is_unset() {
        return String::new();
    }
    match body.find_first_in_document(page) {
        Some(container) => sanitize(page, container, &collect_styles(page), exclude),
        None => String::new(),
    }
}

/// Every `<link>` then every `<style>` tag of the page, serialized verbatim.
pub fn collect_styles(page: &Html) -> String {
    let links = Descriptor::tag("link").find_in_document(page);
    let styles = Descriptor::tag("style").find_in_document(page);
    links.into_iter().chain(styles).map(|el| el.html()).collect()
}

/// Sanitize `container`, which must belong to `page`.
pub fn sanitize(page: &Html, container: ElementRef<'_>, styles: &str, exclude: &[String]) -> String {
    let mut doc = page.clone();
    let body_id = container.id();

    let excluded: Vec<_> = match doc.tree.get(body_id).and_then(ElementRef::wrap) {
        Some(root) => exclude
            .iter()
            .filter_map(|css| match Selector::parse(css) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    warn!(selector = %css, error = %e, "ignoring invalid body exclusion selector");
                    None
                }
            })
            .flat_map(|sel| root.select(&sel).map(|el| el.id()).collect::<Vec<_>>())
            .collect(),
        None => return String::new(),
    };
    for id in excluded {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let empty: Vec<_> = match doc.tree.get(body_id).and_then(ElementRef::wrap) {
        Some(root) => root
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| WRAPPERS.contains(&el.value().name()))
            .filter(|el| el.text().all(|t| t.trim().is_empty()))
            .map(|el| el.id())
            .collect(),
        None => return String::new(),
    };
    for id in empty {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    loop {
        let trailing_br = doc
            .tree
            .get(body_id)
            .and_then(ElementRef::wrap)
            .and_then(|root| root.children().filter_map(ElementRef::wrap).last())
            .filter(|el| el.value().name() == "br")
            .map(|el| el.id());
        match trailing_br.and_then(|id| doc.tree.get_mut(id)) {
            Some(mut node) => node.detach(),
            None => break,
        }
    }

    let mut pretty = String::new();
    if let Some(root) = doc.tree.get(body_id).and_then(ElementRef::wrap) {
        write_element(root, 0, &mut pretty);
    }
    format!("<head>{RESPONSIVE_STYLE}{styles}</head><body dir=\"auto\">{pretty}</body>")
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n(' ', depth));
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

fn write_element(el: ElementRef<'_>, depth: usize, out: &mut String) {
    let name = el.value().name();
    indent(out, depth);
    out.push('<');
    out.push_str(name);
    let mut attrs: Vec<(&str, &str)> = el.value().attrs().collect();
    attrs.sort();
    for (key, value) in attrs {
        let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
    }
    out.push_str(">\n");
    if VOID.contains(&name) {
        return;
    }

    let raw_text = matches!(name, "script" | "style");
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            write_element(child_el, depth + 1, out);
            continue;
        }
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                indent(out, depth + 1);
                if raw_text {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
                out.push('\n');
            }
            Node::Comment(comment) => {
                indent(out, depth + 1);
                let _ = writeln!(out, "<!--{}-->", &**comment);
            }
            _ => {}
        }
    }

    indent(out, depth);
    let _ = writeln!(out, "</{name}>");
}
