//! Content extraction for parsed pages
//!
//! Turns a parsed HTML document into a [`PageRecord`] under a declarative
//! field selection ([`Sections`]). Each field has its own heuristics:
//! - `title`: `<title>`, falling back to the first `<h1>`, then "No Title"
//! - `meta_description`: standard, Open Graph, then Twitter description
//! - `headings`: every non-empty `h1`/`h2`/`h3` in document order
//! - `paragraphs`: every `<p>` longer than 20 characters
//! - `tables`, `links`, `images`: see the submodules
//!
//! Extractors never fail. Unexpected structure degrades to an empty or
//! default value for the affected field only.

mod images;
mod links;
mod record;
mod tables;

pub use images::extract_images;
pub use links::extract_links;
pub use record::{
    ExtractedImage, ExtractedLink, ExtractedTable, LinkContext, LinkType, PageRecord,
};
pub use tables::extract_tables;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Title used when a page has neither a `<title>` nor an `<h1>`
pub const FALLBACK_TITLE: &str = "No Title";

/// Paragraphs at or below this many characters are treated as UI chrome
const MIN_PARAGRAPH_CHARS: usize = 20;

/// A single extractable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    MetaDescription,
    Headings,
    Paragraphs,
    Tables,
    Links,
    Images,
}

/// Field-selection map: which fields to extract from every page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Sections {
    pub title: bool,
    pub meta_description: bool,
    pub headings: bool,
    pub paragraphs: bool,
    pub tables: bool,
    pub links: bool,
    pub images: bool,
}

impl Sections {
    /// Every field enabled
    pub fn all() -> Self {
        Self {
            title: true,
            meta_description: true,
            headings: true,
            paragraphs: true,
            tables: true,
            links: true,
            images: true,
        }
    }

    /// Returns true if at least one field is enabled
    pub fn any(&self) -> bool {
        self.title
            || self.meta_description
            || self.headings
            || self.paragraphs
            || self.tables
            || self.links
            || self.images
    }

    /// Enables a single field
    pub fn enable(&mut self, section: Section) {
        match section {
            Section::Title => self.title = true,
            Section::MetaDescription => self.meta_description = true,
            Section::Headings => self.headings = true,
            Section::Paragraphs => self.paragraphs = true,
            Section::Tables => self.tables = true,
            Section::Links => self.links = true,
            Section::Images => self.images = true,
        }
    }
}

/// Extracts configured fields from parsed documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor {
    sections: Sections,
}

impl ContentExtractor {
    pub fn new(sections: Sections) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> Sections {
        self.sections
    }

    /// Builds the record for one page
    ///
    /// Fields are extracted independently of each other; the document is only
    /// read, never modified.
    ///
    /// # Example
    ///
    /// ```
    /// use scraper::Html;
    /// use site_harvester::extract::{ContentExtractor, Sections};
    ///
    /// let html = Html::parse_document("<title>  Hello   World </title>");
    /// let extractor = ContentExtractor::new(Sections { title: true, ..Sections::default() });
    /// let record = extractor.extract(&html, "https://example.com/");
    /// assert_eq!(record.title.as_deref(), Some("Hello World"));
    /// assert!(record.headings.is_none());
    /// ```
    pub fn extract(&self, document: &Html, page_url: &str) -> PageRecord {
        let sections = self.sections;
        let mut record = PageRecord::new(page_url);

        if sections.title {
            record.title = Some(extract_title(document));
        }
        if sections.meta_description {
            record.meta_description = Some(extract_meta_description(document));
        }
        if sections.headings {
            record.headings = Some(extract_headings(document));
        }
        if sections.paragraphs {
            record.paragraphs = Some(extract_paragraphs(document));
        }
        if sections.tables {
            record.tables = Some(extract_tables(document));
        }
        if sections.links {
            record.links = Some(extract_links(document, page_url));
        }
        if sections.images {
            record.images = Some(extract_images(document, page_url));
        }

        record
    }
}

/// Extracts the page title with whitespace collapsed
pub fn extract_title(document: &Html) -> String {
    if let Some(title) = first_match(document, "title") {
        let text = element_text(&title);
        if !text.is_empty() {
            return collapse_whitespace(&text);
        }
    }

    match first_match(document, "h1") {
        Some(h1) => collapse_whitespace(&element_text(&h1)),
        None => FALLBACK_TITLE.to_string(),
    }
}

/// Extracts the description from the standard, Open Graph or Twitter meta tag
///
/// Returns an empty string when none of them carries content.
pub fn extract_meta_description(document: &Html) -> String {
    [
        r#"meta[name="description"]"#,
        r#"meta[property="og:description"]"#,
        r#"meta[name="twitter:description"]"#,
    ]
    .iter()
    .filter_map(|css| first_match(document, css))
    .filter_map(|meta| meta.value().attr("content").map(str::trim))
    .find(|content| !content.is_empty())
    .map(str::to_string)
    .unwrap_or_default()
}

pub fn extract_headings(document: &Html) -> Vec<String> {
    select_texts(document, "h1, h2, h3")
        .into_iter()
        .filter(|text| !text.is_empty())
        .collect()
}

pub fn extract_paragraphs(document: &Html) -> Vec<String> {
    select_texts(document, "p")
        .into_iter()
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Compiles a CSS selector, yielding `None` instead of an error
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    let found = document.select(&selector).next();
    found
}

fn select_texts(document: &Html, css: &str) -> Vec<String> {
    match selector(css) {
        Some(selector) => document
            .select(&selector)
            .map(|element| element_text(&element))
            .collect(),
        None => Vec::new(),
    }
}

/// Joins the element's trimmed text nodes with single spaces
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
