//! Image extraction

use super::record::ExtractedImage;
use super::selector;
use crate::url::normalize_url;
use scraper::node::Element;
use scraper::Html;
use std::collections::HashSet;

/// Declared dimensions below this many pixels mark an image as an icon
const MIN_IMAGE_DIMENSION: u64 = 20;

/// Alt text used when an image has none
pub const FALLBACK_ALT: &str = "Image";

/// Extracts content images from the page
///
/// # Source Selection
///
/// Candidates are the URLs of every `srcset` (or `data-srcset`) entry, in
/// order, followed by `src` (or `data-src`). The first candidate that is not
/// a data URI and has not been emitted for an earlier image wins. Images
/// whose declared `width` or `height` is a number below 20 are dropped.
pub fn extract_images(document: &Html, page_url: &str) -> Vec<ExtractedImage> {
    let image = match selector("img") {
        Some(image) => image,
        None => return Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut images = Vec::new();

    for element in document.select(&image) {
        let element = element.value();

        let src = match pick_source(element, page_url, &seen) {
            Some(src) => src,
            None => continue,
        };
        seen.insert(src.clone());

        let width = element.attr("width");
        let height = element.attr("height");
        if is_icon_sized(width) || is_icon_sized(height) {
            continue;
        }

        let alt = element
            .attr("alt")
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .unwrap_or(FALLBACK_ALT);

        images.push(ExtractedImage {
            src,
            alt: alt.to_string(),
            width: width.map(str::to_string),
            height: height.map(str::to_string),
        });
    }

    images
}

fn pick_source(element: &Element, page_url: &str, seen: &HashSet<String>) -> Option<String> {
    let src = non_empty_attr(element, "src").or_else(|| non_empty_attr(element, "data-src"));
    let srcset =
        non_empty_attr(element, "srcset").or_else(|| non_empty_attr(element, "data-srcset"));

    let mut candidates = srcset.map(srcset_urls).unwrap_or_default();
    candidates.extend(src);

    candidates
        .into_iter()
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty() && !is_data_uri(candidate))
        .filter_map(|candidate| normalize_url(page_url, candidate))
        .find(|absolute| !seen.contains(absolute))
}

/// Splits a `srcset` value into its URLs, dropping width/density descriptors
fn srcset_urls(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
        .collect()
}

fn non_empty_attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attr(name).filter(|value| !value.is_empty())
}

fn is_data_uri(candidate: &str) -> bool {
    candidate
        .get(..5)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// True when the attribute is a plain integer below the icon threshold
fn is_icon_sized(dimension: Option<&str>) -> bool {
    dimension
        .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|value| value.parse::<u64>().ok())
        .map_or(false, |value| value < MIN_IMAGE_DIMENSION)
}
