//! Origin resolution.
//!
//! Given compiled patterns and a request origin, find the first matching
//! pattern and decide what goes into `Access-Control-Allow-Origin`.
//! Wildcard and regex matches echo the request origin; a pattern literal
//! with `*` or regex syntax is never a valid header value. Exact matches
//! return the configured pattern, which equals the origin byte-for-byte.

use crate::cors::pattern::{PatternEntry, PatternList};

/// A successful resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// Value for `Access-Control-Allow-Origin`.
    pub allow_origin: &'a str,
    /// The pattern that matched.
    pub entry: &'a PatternEntry,
}

impl PartialEq for Resolution<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.allow_origin == other.allow_origin && std::ptr::eq(self.entry, other.entry)
    }
}

impl Eq for Resolution<'_> {}

/// Resolve `origin` against `patterns`. First match wins.
///
/// Returns `None` for an empty origin or when no pattern matches.
pub fn resolve<'a>(patterns: &'a PatternList, origin: &'a str) -> Option<Resolution<'a>> {
    if origin.is_empty() {
        return None;
    }

    let entry = patterns.iter().find(|entry| entry.matches(origin))?;
    let allow_origin = if entry.mode().echoes_origin() {
        origin
    } else {
        entry.raw()
    };

    Some(Resolution {
        allow_origin,
        entry,
    })
}

/// Shorthand for [`resolve`] that only returns the header value.
pub fn allowed_origin<'a>(patterns: &'a PatternList, origin: &'a str) -> Option<&'a str> {
    resolve(patterns, origin).map(|r| r.allow_origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cors::diagnostics::NoopDiagnostics;
    use crate::cors::pattern::{compile, PatternMode};

    fn patterns(raw: &[&str]) -> PatternList {
        compile(raw.iter().copied(), &NoopDiagnostics).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let list = patterns(&["https://a.com", "https://*.com"]);
        let r = resolve(&list, "https://a.com").unwrap();
        assert_eq!(r.allow_origin, "https://a.com");
        assert_eq!(r.entry.mode(), PatternMode::Exact);

        let list = patterns(&["https://*.com", "https://a.com"]);
        let r = resolve(&list, "https://a.com").unwrap();
        assert_eq!(r.entry.mode(), PatternMode::Wildcard);
    }

    #[test]
    fn test_wildcard_echoes_origin() {
        let list = patterns(&["https://*.example.com"]);
        assert_eq!(
            allowed_origin(&list, "https://api.example.com"),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn test_regex_echoes_origin() {
        let list = patterns(&["https://(dev|prod)\\.app\\.com"]);
        assert_eq!(
            allowed_origin(&list, "https://dev.app.com"),
            Some("https://dev.app.com")
        );
    }

    #[test]
    fn test_exact_returns_pattern() {
        let list = patterns(&["https://api.example.org"]);
        let r = resolve(&list, "https://api.example.org").unwrap();
        assert_eq!(r.allow_origin, "https://api.example.org");
        assert_eq!(r.entry.raw(), "https://api.example.org");
    }

    #[test]
    fn test_empty_origin_never_matches() {
        let list = patterns(&["*", "https://a.com", ".*"]);
        assert_eq!(resolve(&list, ""), None);
    }

    #[test]
    fn test_no_match() {
        let list = patterns(&["https://example.com", "https://*.example.org"]);
        assert_eq!(allowed_origin(&list, "https://evil.com"), None);
        assert_eq!(allowed_origin(&PatternList::default(), "https://evil.com"), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let list = patterns(&["https://*.example.com", "https://x.org"]);
        for origin in ["https://a.example.com", "https://x.org", "https://nope.net"] {
            assert_eq!(resolve(&list, origin), resolve(&list, origin));
        }
    }
}
