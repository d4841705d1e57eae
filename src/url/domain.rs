use url::Url;

/// Extracts the network location (`host[:port]`) from a URL string
///
/// The host is lowercased by the URL parser and the port is only included
/// when it is explicit and not the scheme's default. Returns an empty string
/// when the input cannot be parsed or has no host (`mailto:`, `tel:`, ...).
///
/// Subdomains are distinct: `blog.example.com` and `example.com` never
/// compare equal.
///
/// # Examples
///
/// ```
/// use site_harvester::url::domain_of;
///
/// assert_eq!(domain_of("https://Example.com/path"), "example.com");
/// assert_eq!(domain_of("http://localhost:8080/"), "localhost:8080");
/// assert_eq!(domain_of("garbage"), "");
/// ```
pub fn domain_of(url: &str) -> String {
    let parsed = match Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };

    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
