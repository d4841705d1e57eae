//! Structured records produced by the content extractor

use serde::{Deserialize, Serialize};

/// Structured extraction output for one successfully processed page
///
/// Only the fields enabled in [`Sections`](super::Sections) are populated;
/// disabled fields stay `None` and are omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The page's URL as it was dispatched
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headings: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<ExtractedTable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ExtractedLink>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ExtractedImage>>,
}

impl PageRecord {
    /// Creates a record carrying only the page URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Where a link points relative to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
    Email,
    Phone,
}

/// Which region of the page a link was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkContext {
    Nav,
    Footer,
    Sidebar,
    Content,
}

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// Anchor text, or the href when the anchor has no text
    pub text: String,

    /// Absolute, fragment-free target
    pub href: String,

    #[serde(rename = "type")]
    pub link_type: LinkType,

    pub context: LinkContext,
}

/// A top-level data table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// An image reference, after data-URI and icon filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Absolute source URL
    pub src: String,

    pub alt: String,

    /// Declared `width` attribute, verbatim
    pub width: Option<String>,

    /// Declared `height` attribute, verbatim
    pub height: Option<String>,
}
