//! Locale prefix detection.

use std::collections::HashSet;

use serde::Serialize;

/// Locale information extracted from a request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleContext {
    /// Supported locale found as the first path segment.
    pub locale: Option<String>,
    /// Path after the `/xx` prefix, or the whole path when no locale matched.
    /// May be empty (`/fa` → ``).
    pub path_without_locale: String,
    /// `locale`, or the default locale when none matched.
    pub effective: String,
}

/// True for exactly two lowercase ASCII letters.
pub fn is_locale_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Detect a `/xx` or `/xx/...` prefix naming a supported locale.
///
/// A two-letter segment outside `supported` is ordinary path, so `/ca/foo`
/// stays intact.
pub fn resolve_locale(
    path: &str,
    supported: &HashSet<String>,
    default_locale: &str,
) -> LocaleContext {
    match locale_prefix(path) {
        Some(code) if supported.contains(code) => LocaleContext {
            locale: Some(code.to_string()),
            path_without_locale: path[3..].to_string(),
            effective: code.to_string(),
        },
        _ => LocaleContext {
            locale: None,
            path_without_locale: path.to_string(),
            effective: default_locale.to_string(),
        },
    }
}

/// Matches `^/[a-z]{2}(/|$)` and returns the two letters.
fn locale_prefix(path: &str) -> Option<&str> {
    let rest = path.strip_prefix('/')?;
    let code = rest.get(..2)?;
    if !is_locale_code(code) {
        return None;
    }
    match rest.as_bytes().get(2) {
        None | Some(b'/') => Some(code),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> HashSet<String> {
        ["fa", "en"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_locale_with_deep_path() {
        let ctx = resolve_locale("/en/dashboard/x", &supported(), "fa");
        assert_eq!(ctx.locale.as_deref(), Some("en"));
        assert_eq!(ctx.path_without_locale, "/dashboard/x");
        assert_eq!(ctx.effective, "en");
    }

    #[test]
    fn test_bare_locale_leaves_empty_rest() {
        let ctx = resolve_locale("/fa", &supported(), "fa");
        assert_eq!(ctx.locale.as_deref(), Some("fa"));
        assert_eq!(ctx.path_without_locale, "");

        let ctx = resolve_locale("/fa/", &supported(), "fa");
        assert_eq!(ctx.path_without_locale, "/");
    }

    #[test]
    fn test_unsupported_two_letters_is_plain_path() {
        let ctx = resolve_locale("/ca/foo", &supported(), "fa");
        assert_eq!(ctx.locale, None);
        assert_eq!(ctx.path_without_locale, "/ca/foo");
        assert_eq!(ctx.effective, "fa");
    }

    #[test]
    fn test_longer_or_uppercase_segments_are_not_locales() {
        for path in ["/fax", "/faq/x", "/FA/x", "/f", "/", "", "/1a"] {
            let ctx = resolve_locale(path, &supported(), "fa");
            assert_eq!(ctx.locale, None, "path {path:?}");
            assert_eq!(ctx.path_without_locale, path);
        }
    }

    #[test]
    fn test_non_ascii_path_does_not_panic() {
        let ctx = resolve_locale("/fé/x", &supported(), "fa");
        assert_eq!(ctx.locale, None);
        let ctx = resolve_locale("/é", &supported(), "fa");
        assert_eq!(ctx.locale, None);
    }
}
