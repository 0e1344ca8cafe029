use url::Url;

/// Canonicalizes a URL so that duplicates compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; malformed input is returned unchanged
/// 2. Lowercase the scheme and host
/// 3. Drop the port when it is the scheme's default (80/http, 443/https)
/// 4. Default an empty path to `/`
/// 5. Remove the fragment (everything after #)
/// 6. Keep the query string, since it may select different content;
///    only an empty trailing `?` is dropped
///
/// The result is idempotent: canonicalizing a canonical URL returns it
/// unchanged.
///
/// # Examples
///
/// ```
/// use driftnet::url::canonicalize;
///
/// assert_eq!(canonicalize("HTTP://Example.COM:80/page#top"), "http://example.com/page");
/// assert_eq!(canonicalize("https://example.com:8443"), "https://example.com:8443/");
/// assert_eq!(canonicalize("not a url"), "not a url");
/// ```
pub fn canonicalize(url_str: &str) -> String {
    // Url::parse lowercases scheme/host, elides default ports and fills in
    // the root path for http(s).
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        assert_eq!(canonicalize("https://x.com/a#frag"), "https://x.com/a");
        assert_eq!(canonicalize("https://x.com/a#"), "https://x.com/a");
    }

    #[test]
    fn test_fragment_variants_match() {
        assert_eq!(
            canonicalize("https://x.com/a#frag"),
            canonicalize("https://x.com/a")
        );
    }

    #[test]
    fn test_default_port_elided() {
        assert_eq!(canonicalize("http://x.com:80/p"), canonicalize("http://x.com/p"));
        assert_eq!(canonicalize("https://x.com:443/p"), "https://x.com/p");
    }

    #[test]
    fn test_non_default_port_kept() {
        assert_eq!(canonicalize("https://x.com:8443/p"), "https://x.com:8443/p");
        assert_eq!(canonicalize("http://x.com:443/p"), "http://x.com:443/p");
    }

    #[test]
    fn test_lowercase_scheme_and_host() {
        assert_eq!(
            canonicalize("HTTPS://EXAMPLE.COM/Page"),
            "https://example.com/Page"
        );
    }

    #[test]
    fn test_empty_path_becomes_root() {
        assert_eq!(canonicalize("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_query_preserved() {
        assert_eq!(
            canonicalize("https://example.com/search?q=rust&page=2#results"),
            "https://example.com/search?q=rust&page=2"
        );
    }

    #[test]
    fn test_empty_query_dropped() {
        assert_eq!(canonicalize("https://example.com/p?"), "https://example.com/p");
    }

    #[test]
    fn test_malformed_returned_unchanged() {
        assert_eq!(canonicalize("not a url"), "not a url");
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("http://"), "http://");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTP://Sub.Example.com:80/Path/../index.html?x=1#frag",
            "https://x.com:8443/p?b=2&a=1",
            "https://example.com",
            "http://example.com/a%20b/",
            "https://example.com/p?",
            "https://例え.jp/パス",
        ];

        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "not idempotent for {}", input);
        }
    }
}
