//! Link extraction and classification

use super::record::{ExtractedLink, LinkContext, LinkType};
use super::{element_text, selector};
use crate::url::{domain_of, normalize_url};
use scraper::node::Element;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Class names that mark a `<div>` as sidebar chrome
const SIDEBAR_CLASSES: &[&str] = &["sidebar", "menu", "widget"];

/// Extracts every followable anchor on the page
///
/// Links are resolved against `page_url`, stripped of fragments, and
/// deduplicated by their resolved href (first occurrence wins). Empty,
/// fragment-only and `javascript:` hrefs are skipped.
pub fn extract_links(document: &Html, page_url: &str) -> Vec<ExtractedLink> {
    let anchor = match selector("a[href]") {
        Some(anchor) => anchor,
        None => return Vec::new(),
    };

    let page_domain = domain_of(page_url);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor) {
        let raw = element.value().attr("href").unwrap_or_default();
        let href = match normalize_url(page_url, raw) {
            Some(href) => href,
            None => continue,
        };

        if !seen.insert(href.clone()) {
            continue;
        }

        let text = element_text(&element);
        links.push(ExtractedLink {
            text: if text.is_empty() { href.clone() } else { text },
            link_type: classify_type(&href, &page_domain),
            context: classify_context(&element),
            href,
        });
    }

    links
}

/// Classifies a resolved href relative to the page's own domain
///
/// `mailto:` and `tel:` take precedence; otherwise a link is internal when it
/// shares the page's exact network location.
pub fn classify_type(href: &str, page_domain: &str) -> LinkType {
    if has_scheme(href, "mailto:") {
        return LinkType::Email;
    }
    if has_scheme(href, "tel:") {
        return LinkType::Phone;
    }

    if !page_domain.is_empty() && domain_of(href) == page_domain {
        LinkType::Internal
    } else {
        LinkType::External
    }
}

/// Classifies the page region an anchor sits in from its ancestors
pub fn classify_context(anchor: &ElementRef) -> LinkContext {
    let ancestors: Vec<&Element> = anchor
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .collect();

    let has_ancestor = |name: &str| ancestors.iter().any(|element| element.name() == name);

    if has_ancestor("nav") || has_ancestor("header") {
        return LinkContext::Nav;
    }
    if has_ancestor("footer") {
        return LinkContext::Footer;
    }
    if has_ancestor("aside") {
        return LinkContext::Sidebar;
    }

    // Only the closest enclosing div is inspected for sidebar classes
    let sidebar_div = ancestors
        .iter()
        .find(|element| element.name() == "div")
        .map_or(false, |div| {
            div.classes().any(|class| SIDEBAR_CLASSES.contains(&class))
        });

    if sidebar_div {
        LinkContext::Sidebar
    } else {
        LinkContext::Content
    }
}

fn has_scheme(href: &str, scheme: &str) -> bool {
    href.get(..scheme.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
}
