//! URL canonicalisation and crawl scope.
//!
//! Every URL that enters the frontier goes through [`normalize`] so that
//! `https://ex.com/a/`, `https://ex.com/a#top` and `https://ex.com/a` all
//! collapse to one key.

use url::Url;

/// href prefixes that never lead to a crawlable page
const SKIPPED_HREF_PREFIXES: [&str; 4] = ["mailto:", "tel:", "#", "javascript:"];

/// Resolve `href` against `base` and canonicalise the result.
///
/// Never fails: if the href cannot be resolved the raw string is cleaned
/// as-is and will simply fail to fetch later.
pub fn normalize(href: &str, base: &str) -> String {
    let href = href.trim();

    let resolved = Url::parse(base)
        .and_then(|base_url| base_url.join(href))
        .or_else(|_| Url::parse(href));

    match resolved {
        Ok(url) => clean_parsed(url),
        Err(_) => clean_url(href),
    }
}

/// Canonicalise an already absolute URL: drop the fragment and any trailing
/// slash. Idempotent.
pub fn clean_url(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed) => clean_parsed(parsed),
        Err(_) => {
            let without_fragment = url.trim().split('#').next().unwrap_or_default();
            trim_trailing_slashes(without_fragment).to_string()
        }
    }
}

fn clean_parsed(mut url: Url) -> String {
    url.set_fragment(None);
    trim_trailing_slashes(url.as_str()).to_string()
}

fn trim_trailing_slashes(s: &str) -> &str {
    let mut trimmed = s;
    while trimmed.len() > 1 && trimmed.ends_with('/') {
        trimmed = &trimmed[..trimmed.len() - 1];
    }
    trimmed
}

/// Turn user input (`example.com`, `https://www.example.com/`) into the
/// normalized start URL, defaulting the scheme to https.
pub fn seed_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http") {
        clean_url(input)
    } else {
        clean_url(&format!("https://{}", input))
    }
}

/// The crawl scope of an absolute URL: lower-cased host plus any explicit
/// port, with a leading `www.` removed. `None` for URLs without a host or
/// with a non-HTTP scheme.
pub fn domain_scope(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Whether an anchor href is worth resolving at all.
pub fn is_followable_href(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty()
        && !SKIPPED_HREF_PREFIXES
            .iter()
            .any(|prefix| href.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url_strips_trailing_slash() {
        assert_eq!(clean_url("https://ex.com/a/"), "https://ex.com/a");
    }

    #[test]
    fn test_clean_url_strips_fragment_and_root_slash() {
        assert_eq!(clean_url("https://ex.com/#frag"), "https://ex.com");
        assert_eq!(clean_url("https://ex.com/page#section"), "https://ex.com/page");
    }

    #[test]
    fn test_clean_url_keeps_query() {
        assert_eq!(
            clean_url("https://ex.com/search?q=rust"),
            "https://ex.com/search?q=rust"
        );
    }

    #[test]
    fn test_clean_url_unparseable_is_best_effort() {
        assert_eq!(clean_url("not a url/#x"), "not a url");
        assert_eq!(clean_url("/"), "/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://ex.com/",
            "https://ex.com//",
            "https://ex.com/a/b/",
            "https://ex.com/a/?x=1/",
            "https://EX.com/a#frag",
            "http://127.0.0.1:8080/",
            "https://ex.com/caf\u{e9}/",
            "garbage input/",
        ];
        for input in inputs {
            let once = normalize(input, "https://ex.com");
            let twice = normalize(&once, "https://ex.com");
            assert_eq!(once, twice, "normalize not idempotent for {}", input);
        }
    }

    #[test]
    fn test_normalize_resolves_relative_links() {
        assert_eq!(normalize("/a", "https://ex.com/b/c"), "https://ex.com/a");
        assert_eq!(normalize("d/", "https://ex.com/b/c"), "https://ex.com/b/d");
        assert_eq!(normalize("../", "https://ex.com/b/c/"), "https://ex.com/b");
        assert_eq!(normalize("?p=2", "https://ex.com/list"), "https://ex.com/list?p=2");
    }

    #[test]
    fn test_normalize_keeps_absolute_links() {
        assert_eq!(
            normalize("https://other.org/x/#y", "https://ex.com/"),
            "https://other.org/x"
        );
    }

    #[test]
    fn test_seed_url_defaults_to_https() {
        assert_eq!(seed_url("example.com"), "https://example.com");
        assert_eq!(seed_url("  http://example.com/  "), "http://example.com");
        assert_eq!(seed_url("https://www.example.com/"), "https://www.example.com");
    }

    #[test]
    fn test_domain_scope_strips_www() {
        assert_eq!(
            domain_scope("https://www.Example.com/a"),
            Some("example.com".to_string())
        );
        assert_eq!(
            domain_scope("https://example.com"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_domain_scope_keeps_explicit_port() {
        assert_eq!(
            domain_scope("http://127.0.0.1:8080/x"),
            Some("127.0.0.1:8080".to_string())
        );
        assert_eq!(
            domain_scope("https://example.com:443/"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_domain_scope_rejects_non_http() {
        assert_eq!(domain_scope("ftp://example.com/file"), None);
        assert_eq!(domain_scope("not a url"), None);
    }

    #[test]
    fn test_is_followable_href() {
        assert!(is_followable_href("/about"));
        assert!(is_followable_href("https://ex.com"));
        assert!(!is_followable_href(""));
        assert!(!is_followable_href("   "));
        assert!(!is_followable_href("mailto:me@ex.com"));
        assert!(!is_followable_href("tel:+123"));
        assert!(!is_followable_href("#top"));
        assert!(!is_followable_href("javascript:void(0)"));
    }
}
