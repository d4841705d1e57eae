use url::{ParseError, Url};

/// Resolves `link` against `base` and strips any fragment
///
/// # Resolution Rules
///
/// 1. Trim surrounding whitespace from the link
/// 2. Reject empty links, in-page fragments (`#section`) and `javascript:`
///    pseudo-URLs
/// 3. Absolute links are returned as written, minus the fragment; relative
///    links are joined onto `base` using standard URL-joining rules
/// 4. Remove the fragment
///
/// Non-HTTP schemes such as `mailto:` and `tel:` are kept so callers can
/// classify them; use [`is_valid_url`](super::is_valid_url) to filter for
/// crawlable addresses.
///
/// # Returns
///
/// * `Some(String)` - The absolute, fragment-free URL
/// * `None` - The link was rejected or could not be resolved
///
/// # Examples
///
/// ```
/// use site_harvester::url::normalize_url;
///
/// let url = normalize_url("https://example.com/docs/", "intro#top").unwrap();
/// assert_eq!(url, "https://example.com/docs/intro");
///
/// assert_eq!(normalize_url("https://example.com/", "https://example.com"), Some("https://example.com".to_string()));
/// assert_eq!(normalize_url("https://example.com/", "#top"), None);
/// ```
pub fn normalize_url(base: &str, link: &str) -> Option<String> {
    let link = link.trim();

    if link.is_empty() || link.starts_with('#') || is_script_link(link) {
        return None;
    }

    match Url::parse(link) {
        Ok(_) => Some(strip_fragment(link).to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base.trim()).ok()?;
            let mut resolved = base.join(link).ok()?;
            resolved.set_fragment(None);
            Some(resolved.into())
        }
        Err(_) => None,
    }
}

/// Returns the parser's serialization of `url` without its fragment
///
/// Two spellings of one address (`http://host` and `http://host/`, mixed-case
/// hosts, default ports) share a canonical form, which makes it usable as an
/// identity key. Unparseable input is returned trimmed.
///
/// # Examples
///
/// ```
/// use site_harvester::url::canonical_url;
///
/// assert_eq!(canonical_url("http://Example.com"), "http://example.com/");
/// assert_eq!(canonical_url("https://example.com:443/a#b"), "https://example.com/a");
/// ```
pub fn canonical_url(url: &str) -> String {
    let url = url.trim();
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}

fn strip_fragment(link: &str) -> &str {
    link.split_once('#').map_or(link, |(before, _)| before)
}

/// Checks for `javascript:` pseudo-URLs, ignoring ASCII case
fn is_script_link(link: &str) -> bool {
    link.get(..11)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("javascript:"))
}
