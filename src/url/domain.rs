use url::Url;

/// Extracts the domain from a parsed URL
///
/// Returns the lowercase host, or None if the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use driftnet::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the hostname of a URL string, or an empty string on parse failure
///
/// # Examples
///
/// ```
/// use driftnet::url::host_of;
///
/// assert_eq!(host_of("https://Blog.Example.com:8080/post"), "blog.example.com");
/// assert_eq!(host_of("not a url"), "");
/// ```
pub fn host_of(url_str: &str) -> String {
    Url::parse(url_str)
        .ok()
        .and_then(|url| extract_domain(&url))
        .unwrap_or_default()
}

/// Returns the last two dot-separated labels of a host
///
/// This is a cheap heuristic, not public-suffix aware: "news.bbc.co.uk"
/// groups under "co.uk". It is only used to spread the crawl across sites.
/// Hosts with fewer than two labels are returned unchanged.
///
/// # Examples
///
/// ```
/// use driftnet::url::superdomain_of;
///
/// assert_eq!(superdomain_of("api.v2.example.com"), "example.com");
/// assert_eq!(superdomain_of("localhost"), "localhost");
/// ```
pub fn superdomain_of(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}
