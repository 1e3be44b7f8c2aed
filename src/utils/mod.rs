//! Utility functions and helpers.

pub mod date;
pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Falls back to plain concatenation when the join fails.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{base}{href}"))
}

/// Resolve a URL string against a base URL string.
///
/// Falls back to plain concatenation when the base does not parse.
pub fn resolve(base_url: &str, href: &str) -> String {
    match Url::parse(base_url) {
        Ok(base) => resolve_url(&base, href),
        Err(_) => format!("{base_url}{href}"),
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_resolve_url_failed_join_concatenates() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            resolve_url(&base, "https://[bad"),
            "https://example.com/https://[bad"
        );
    }

    #[test]
    fn test_resolve_matches_concatenation_for_relative_hrefs() {
        let base = "https://www.pilotjobsnetwork.com/";
        let href = "jobs/air-acme";
        assert_eq!(resolve(base, href), format!("{base}{href}"));
    }

    #[test]
    fn test_resolve_root_relative_has_no_double_slash() {
        assert_eq!(
            resolve("https://www.pilotjobsnetwork.com/", "/jobs/x"),
            "https://www.pilotjobsnetwork.com/jobs/x"
        );
    }

    #[test]
    fn test_resolve_unparseable_base_concatenates() {
        assert_eq!(resolve("local/", "jobs/x"), "local/jobs/x");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
        assert_eq!(normalize_whitespace("   "), "");
    }
}
