//! Compiled path patterns.

use regex::Regex;
use thiserror::Error;

/// Marker that opens a trailing catch-all segment.
const CATCH_ALL_MARKER: &str = "{**";

/// Error compiling a path pattern.
#[derive(Debug, Error)]
#[error("invalid route pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The offending pattern.
    pub pattern: String,
    /// Underlying regex failure.
    #[source]
    pub source: regex::Error,
}

/// A path pattern compiled for matching.
///
/// The kind is decided once at compile time, in this order:
///
/// 1. contains `{**` → [`RoutePattern::CatchAll`] on the text before the marker
/// 2. contains a `{name}` placeholder → [`RoutePattern::Template`]
/// 3. otherwise → [`RoutePattern::Exact`]
///
/// Every kind compiles to an anchored `(?i)` regex, so all three fold case
/// the same way (Unicode simple case folding).
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Prefix match on the literal text before the marker.
    CatchAll {
        /// `^prefix`, unanchored at the end.
        regex: Regex,
    },
    /// Full match with one `[^/]+` per placeholder.
    Template {
        /// `^...$` with placeholders expanded.
        regex: Regex,
    },
    /// Full match on the literal path.
    Exact {
        /// `^path$`.
        regex: Regex,
    },
}

impl RoutePattern {
    /// Compiles a pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern expands to a regex that cannot be
    /// compiled (for example one exceeding the regex size limit).
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let build = |source: String| {
            Regex::new(&source).map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })
        };

        if let Some(idx) = pattern.find(CATCH_ALL_MARKER) {
            let regex = build(format!("(?i)^{}", regex::escape(&pattern[..idx])))?;
            return Ok(Self::CatchAll { regex });
        }

        match template_regex(pattern) {
            Some(source) => Ok(Self::Template {
                regex: build(source)?,
            }),
            None => Ok(Self::Exact {
                regex: build(format!("(?i)^{}$", regex::escape(pattern)))?,
            }),
        }
    }

    /// Tests a request path against this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::CatchAll { regex } | Self::Template { regex } | Self::Exact { regex } => {
                regex.is_match(path)
            }
        }
    }

    /// Returns a short name for the pattern kind, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CatchAll { .. } => "catch_all",
            Self::Template { .. } => "template",
            Self::Exact { .. } => "exact",
        }
    }
}

/// Expands `{name}` placeholders into a regex source.
///
/// Literal text is escaped. Returns `None` when the pattern has no
/// well-formed placeholder, so that it can be matched as an exact path.
fn template_regex(pattern: &str) -> Option<String> {
    let mut source = String::from("(?i)^");
    let mut rest = pattern;
    let mut placeholders = 0usize;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        source.push_str(&regex::escape(&rest[..open]));
        source.push_str("[^/]+");
        placeholders += 1;
        rest = &rest[open + close + 1..];
    }

    if placeholders == 0 {
        return None;
    }

    source.push_str(&regex::escape(rest));
    source.push('$');
    Some(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> RoutePattern {
        RoutePattern::compile(pattern).unwrap()
    }

    #[test]
    fn test_pattern_kinds() {
        assert_eq!(compile("/api/internal/{**rest}").kind(), "catch_all");
        assert_eq!(compile("/api/{id}/details").kind(), "template");
        assert_eq!(compile("/health").kind(), "exact");
    }

    #[test]
    fn test_catch_all_matches_prefix() {
        let pattern = compile("/api/internal/{**rest}");
        assert!(pattern.matches("/api/internal/anything/deep"));
        assert!(pattern.matches("/API/Internal/x"));
        assert!(pattern.matches("/api/internal/"));
        assert!(!pattern.matches("/api/external/x"));
        assert!(!pattern.matches("/api/internal"));
    }

    #[test]
    fn test_template_matches_single_segment() {
        let pattern = compile("/api/{id}/details");
        assert!(pattern.matches("/api/42/details"));
        assert!(pattern.matches("/API/abc/DETAILS"));
        assert!(!pattern.matches("/api/42/43/details"));
        assert!(!pattern.matches("/api//details"));
        assert!(!pattern.matches("/api/42/details/extra"));
    }

    #[test]
    fn test_template_escapes_literals() {
        let pattern = compile("/v1.0/{id}");
        assert!(pattern.matches("/v1.0/7"));
        assert!(!pattern.matches("/v1x0/7"));
    }

    #[test]
    fn test_template_multiple_placeholders() {
        let pattern = compile("/orgs/{org}/users/{id}");
        assert!(pattern.matches("/orgs/acme/users/1"));
        assert!(!pattern.matches("/orgs/acme/users"));
    }

    #[test]
    fn test_unclosed_brace_is_exact() {
        let pattern = compile("/weird/{id");
        assert_eq!(pattern.kind(), "exact");
        assert!(pattern.matches("/WEIRD/{id"));
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let pattern = compile("/health");
        assert!(pattern.matches("/Health"));
        assert!(!pattern.matches("/health/"));
    }

    #[test]
    fn test_catch_all_does_not_split_multibyte_chars() {
        let pattern = compile("/ab{**rest}");
        assert!(!pattern.matches("/aé"));
    }

    #[test]
    fn test_every_kind_folds_non_ascii_case() {
        assert!(compile("/über/{**rest}").matches("/ÜBER/x"));
        assert!(compile("/über/{id}").matches("/ÜBER/7"));
        assert!(compile("/über").matches("/ÜBER"));
        assert!(compile("/ÉTÉ").matches("/été"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(!compile("/a.b").matches("/axb"));
        assert!(!compile("/a+/{**rest}").matches("/aa/x"));
        assert!(compile("/a+/{**rest}").matches("/A+/x"));
    }
}
