//! Origin pattern compilation.
//!
//! # Classification
//! Each raw pattern is classified once, in this order:
//! 1. contains `*` → [`PatternMode::Wildcard`]: `.` is escaped, then every
//!    `*` becomes `.*`. No other metacharacter is escaped.
//! 2. contains any of `[]{}()*+?|\^$` → [`PatternMode::Regex`]: used verbatim.
//! 3. otherwise → [`PatternMode::Exact`]: fully escaped.
//!
//! Every generated expression is wrapped as `^(?:...)$`, so a matcher only
//! accepts a candidate that it matches from start to end, even when the
//! pattern has a top-level `|`.

use std::fmt;

use regex::Regex;

use crate::cors::diagnostics::CorsDiagnostics;
use crate::cors::error::PatternCompileError;

/// Characters that mark a pattern without `*` as a regular expression.
const REGEX_META: &[char] = &[
    '[', ']', '{', '}', '(', ')', '*', '+', '?', '|', '\\', '^', '$',
];

/// How a configured origin pattern is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternMode {
    /// Literal string, byte-for-byte.
    Exact,
    /// Glob-style `*` placeholders.
    Wildcard,
    /// Full regular expression.
    Regex,
}

impl PatternMode {
    /// Classify a raw pattern by its syntax.
    pub fn classify(raw: &str) -> Self {
        if raw.contains('*') {
            PatternMode::Wildcard
        } else if raw.contains(REGEX_META) {
            PatternMode::Regex
        } else {
            PatternMode::Exact
        }
    }

    /// Whether a match should echo the request origin instead of the pattern.
    pub fn echoes_origin(self) -> bool {
        !matches!(self, PatternMode::Exact)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternMode::Exact => "exact",
            PatternMode::Wildcard => "wildcard",
            PatternMode::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compiled origin pattern.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    raw: String,
    mode: PatternMode,
    matcher: Regex,
}

impl PatternEntry {
    /// Compile a single raw pattern.
    pub fn compile(raw: &str) -> Result<Self, PatternCompileError> {
        let mode = PatternMode::classify(raw);
        let expr = anchored_expression(raw, mode);
        let matcher = Regex::new(&expr).map_err(|source| PatternCompileError {
            pattern: raw.to_string(),
            source,
        })?;

        Ok(Self {
            raw: raw.to_string(),
            mode,
            matcher,
        })
    }

    /// The pattern exactly as configured.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// The anchored expression the matcher was built from.
    pub fn expression(&self) -> &str {
        self.matcher.as_str()
    }

    /// Returns true if `candidate` matches this pattern in full.
    pub fn matches(&self, candidate: &str) -> bool {
        self.matcher.is_match(candidate)
    }
}

/// Build the `^(?:...)$` expression for a raw pattern in the given mode.
fn anchored_expression(raw: &str, mode: PatternMode) -> String {
    let body = match mode {
        PatternMode::Wildcard => raw.replace('.', "\\.").replace('*', ".*"),
        PatternMode::Regex => raw.to_string(),
        PatternMode::Exact => regex::escape(raw),
    };
    format!("^(?:{})$", body)
}

/// Ordered list of compiled patterns. Configuration order is match order.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    entries: Vec<PatternEntry>,
}

impl PatternList {
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatternEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a PatternList {
    type Item = &'a PatternEntry;
    type IntoIter = std::slice::Iter<'a, PatternEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Compile raw patterns in order, stopping at the first one that fails.
pub fn compile<I, S>(
    raw_patterns: I,
    diagnostics: &dyn CorsDiagnostics,
) -> Result<PatternList, PatternCompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries = Vec::new();

    for raw in raw_patterns {
        let raw = raw.as_ref();
        match PatternEntry::compile(raw) {
            Ok(entry) => {
                diagnostics.pattern_compiled(&entry);
                entries.push(entry);
            }
            Err(err) => {
                diagnostics.pattern_failed(&err);
                return Err(err);
            }
        }
    }

    Ok(PatternList { entries })
}
