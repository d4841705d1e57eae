//! HTML parsing with a strict-then-lenient fallback
//!
//! Parsing is modelled as the [`HtmlParser`] capability. A [`ParserChain`]
//! tries its parsers in order and returns the first tree that is accepted:
//! - [`StrictParser`] rejects documents the tree builder had to repair heavily
//! - [`LenientParser`] always returns html5ever's best-effort tree

use scraper::{Html, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// Default number of tree-builder errors the strict parser tolerates
pub const DEFAULT_MAX_PARSE_ERRORS: usize = 100;

/// Why a document could not be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("document is empty")]
    EmptyInput,

    #[error("document produced {count} parse errors (limit {limit})")]
    TooManyErrors { count: usize, limit: usize },

    #[error("document rejected: {0}")]
    Rejected(String),
}

/// A backend that turns raw markup into a queryable tree
pub trait HtmlParser: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    fn parse(&self, raw: &str) -> Result<Html, ParseFailure>;
}

/// Parses a full document and rejects markup with too many errors
#[derive(Debug, Clone, Copy)]
pub struct StrictParser {
    max_errors: usize,
}

impl StrictParser {
    pub fn new(max_errors: usize) -> Self {
        Self { max_errors }
    }
}

impl Default for StrictParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARSE_ERRORS)
    }
}

impl HtmlParser for StrictParser {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn parse(&self, raw: &str) -> Result<Html, ParseFailure> {
        if raw.contains('\0') {
            return Err(ParseFailure::Rejected(
                "input contains NUL bytes".to_string(),
            ));
        }

        let document = Html::parse_document(raw);
        if document.errors.len() > self.max_errors {
            return Err(ParseFailure::TooManyErrors {
                count: document.errors.len(),
                limit: self.max_errors,
            });
        }

        Ok(document)
    }
}

/// Never fails: returns whatever tree html5ever recovers from the input
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientParser;

impl HtmlParser for LenientParser {
    fn name(&self) -> &'static str {
        "lenient"
    }

    fn parse(&self, raw: &str) -> Result<Html, ParseFailure> {
        Ok(Html::parse_document(raw))
    }
}

/// Ordered list of parser backends
pub struct ParserChain {
    parsers: Vec<Box<dyn HtmlParser>>,
}

impl ParserChain {
    pub fn new(parsers: Vec<Box<dyn HtmlParser>>) -> Self {
        Self { parsers }
    }

    /// Parses with each backend in turn, returning the first success
    ///
    /// # Returns
    ///
    /// * `Ok(Html)` - The first accepted tree
    /// * `Err(ParseFailure::EmptyInput)` - The input was empty
    /// * `Err(ParseFailure)` - Every backend failed; the last failure is returned
    pub fn parse(&self, raw: &str) -> Result<Html, ParseFailure> {
        if raw.is_empty() {
            return Err(ParseFailure::EmptyInput);
        }

        let mut last_failure = ParseFailure::Rejected("no parser configured".to_string());
        for parser in &self.parsers {
            match parser.parse(raw) {
                Ok(document) => return Ok(document),
                Err(failure) => {
                    tracing::debug!("{} parser rejected document: {}", parser.name(), failure);
                    last_failure = failure;
                }
            }
        }

        Err(last_failure)
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StrictParser::default()),
            Box::new(LenientParser),
        ])
    }
}

/// Parses raw HTML with the default strict-then-lenient chain
///
/// Returns `None` for empty input.
///
/// # Example
///
/// ```
/// use site_harvester::crawler::parse_document;
///
/// let document = parse_document("<html><head><title>Test</title></head></html>").unwrap();
/// assert_eq!(document.root_element().value().name(), "html");
/// assert!(parse_document("").is_none());
/// ```
pub fn parse_document(raw: &str) -> Option<Html> {
    ParserChain::default().parse(raw).ok()
}

/// Collects every anchor's raw `href` attribute
///
/// Values are returned verbatim, without resolution or filtering, in document
/// order with duplicates removed.
pub fn extract_raw_links(document: &Html) -> Vec<String> {
    let anchor = match Selector::parse("a[href]") {
        Ok(anchor) => anchor,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    document
        .select(&anchor)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| seen.insert(*href))
        .map(str::to_string)
        .collect()
}
