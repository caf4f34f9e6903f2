//! Fingerprint catalog and matcher
//!
//! Regex fingerprints are compiled once when the catalog is built. A pattern
//! that fails to compile is remembered, not dropped: every `match_body` call
//! that reaches it fails, exactly as if it had been compiled on the spot.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use tracing::warn;

use subtake_common::{Evidence, Fingerprint, SubtakeError, SubtakeResult};

use crate::builtin::BUILTIN_FINGERPRINTS;

/// Characters of body context kept on each side of a snippet match.
pub const SNIPPET_CONTEXT_CHARS: usize = 100;

#[derive(Debug)]
enum Matcher {
    /// Lowercased pattern for case-insensitive containment.
    Literal(String),
    Regex(Regex),
    Invalid(String),
}

#[derive(Debug)]
struct CompiledFingerprint {
    fingerprint: Fingerprint,
    matcher: Matcher,
    /// Case-insensitive search for the literal pattern text, used for snippets.
    locator: Option<Regex>,
}

impl CompiledFingerprint {
    fn compile(fingerprint: Fingerprint) -> Self {
        let matcher = if fingerprint.regex {
            match Regex::new(&fingerprint.pattern) {
                Ok(re) => Matcher::Regex(re),
                Err(e) => Matcher::Invalid(e.to_string()),
            }
        } else {
            Matcher::Literal(fingerprint.pattern.to_lowercase())
        };

        let locator = RegexBuilder::new(&regex::escape(&fingerprint.pattern))
            .case_insensitive(true)
            .build()
            .ok();

        Self {
            fingerprint,
            matcher,
            locator,
        }
    }

    fn is_match(&self, body: &str, body_lower: &str) -> SubtakeResult<bool> {
        match &self.matcher {
            Matcher::Literal(pattern) => Ok(body_lower.contains(pattern.as_str())),
            Matcher::Regex(re) => Ok(re.is_match(body)),
            Matcher::Invalid(reason) => Err(self.compile_error(reason)),
        }
    }

    fn compile_error(&self, reason: &str) -> SubtakeError {
        SubtakeError::PatternCompile {
            pattern: self.fingerprint.pattern.clone(),
            reason: reason.to_string(),
        }
    }

    /// Body context around the first occurrence of the literal pattern text.
    ///
    /// Regex fingerprints are located by their literal source too, so a regex
    /// whose source never appears verbatim yields an empty snippet.
    fn snippet(&self, body: &str) -> String {
        let Some(found) = self.locator.as_ref().and_then(|re| re.find(body)) else {
            return String::new();
        };

        let start = body[..found.start()]
            .char_indices()
            .rev()
            .take(SNIPPET_CONTEXT_CHARS)
            .last()
            .map_or(found.start(), |(i, _)| i);
        let end = body[found.end()..]
            .char_indices()
            .nth(SNIPPET_CONTEXT_CHARS)
            .map_or(body.len(), |(i, _)| found.end() + i);

        body[start..end].to_string()
    }
}

/// Ordered, immutable fingerprint catalog.
#[derive(Debug, Default)]
pub struct FingerprintCatalog {
    entries: Vec<CompiledFingerprint>,
}

impl FingerprintCatalog {
    pub fn new(fingerprints: Vec<Fingerprint>) -> Self {
        let entries: Vec<_> = fingerprints
            .into_iter()
            .map(CompiledFingerprint::compile)
            .collect();

        for entry in &entries {
            if let Matcher::Invalid(reason) = &entry.matcher {
                warn!(
                    service = %entry.fingerprint.service,
                    pattern = %entry.fingerprint.pattern,
                    "fingerprint regex does not compile: {}",
                    reason
                );
            }
        }

        Self { entries }
    }

    /// Catalog holding only the built-in fingerprints.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_FINGERPRINTS.clone())
    }

    /// Built-ins followed by `custom`, without de-duplication.
    pub fn builtin_with(custom: Vec<Fingerprint>) -> Self {
        let mut all = BUILTIN_FINGERPRINTS.clone();
        all.extend(custom);
        Self::new(all)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.iter().map(|e| &e.fingerprint)
    }

    /// First regex compile failure, if any.
    pub fn validate(&self) -> SubtakeResult<()> {
        for entry in &self.entries {
            if let Matcher::Invalid(reason) = &entry.matcher {
                return Err(entry.compile_error(reason));
            }
        }
        Ok(())
    }

    fn matching(&self, body: &str) -> SubtakeResult<Vec<&CompiledFingerprint>> {
        let body_lower = body.to_lowercase();
        let mut matches = Vec::new();
        for entry in &self.entries {
            if entry.is_match(body, &body_lower)? {
                matches.push(entry);
            }
        }
        Ok(matches)
    }

    /// Fingerprints matching `body`, in catalog order.
    ///
    /// Fails on the first uncompilable regex; no partial results.
    pub fn match_body(
        &self,
        body: &str,
        _headers: &BTreeMap<String, String>,
    ) -> SubtakeResult<Vec<&Fingerprint>> {
        Ok(self
            .matching(body)?
            .into_iter()
            .map(|e| &e.fingerprint)
            .collect())
    }

    /// Like [`match_body`](Self::match_body) but with a snippet per match.
    pub fn evidence(
        &self,
        body: &str,
        _headers: &BTreeMap<String, String>,
    ) -> SubtakeResult<Vec<Evidence>> {
        Ok(self
            .matching(body)?
            .into_iter()
            .map(|e| Evidence::new(&e.fingerprint, e.snippet(body)))
            .collect())
    }
}
