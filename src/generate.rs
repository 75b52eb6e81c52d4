//! Example-sentence generation boundary.
//!
//! The generator itself is a remote text-generation oracle and stays out
//! of this crate: [`ExampleGenerator`] is the seam.  Given a CEFR level,
//! a lemma, a meaning and a sentence count it returns that many example
//! sentences, or fails.  Callers degrade a failure to an empty list and
//! keep going.
//!
//! What does live here is the client-side plumbing around the capability:
//! a fixed pre-call throttle ([`Throttled`]) and a strict parser for the
//! oracle's free-text list output ([`parse_sentence_list`]) — either the
//! text is a well-formed list of strings or parsing fails explicitly;
//! intent is never guessed.

use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Failure of the generation capability or of parsing its output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("example generation failed: {0}")]
    Capability(String),
    #[error("unparseable example list: {0:?}")]
    Unparseable(String),
}

/// External example-sentence generation capability.
pub trait ExampleGenerator {
    /// Generate `count` example sentences for `lemma` with the given
    /// `meaning`, calibrated to the CEFR `level`.
    fn generate(
        &self,
        level: &str,
        lemma: &str,
        meaning: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerateError>;
}

/// Generator that produces nothing — for disabled generation and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGenerator;

impl ExampleGenerator for NullGenerator {
    fn generate(
        &self,
        _level: &str,
        _lemma: &str,
        _meaning: &str,
        _count: usize,
    ) -> Result<Vec<String>, GenerateError> {
        Ok(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Throttle
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed delay before every call to the remote capability — a crude
/// client-side throttle, not adaptive backoff.
pub const THROTTLE: Duration = Duration::from_secs(5);

/// Decorator inserting a fixed sleep before every inner call.
pub struct Throttled<G> {
    inner: G,
    delay: Duration,
}

impl<G> Throttled<G> {
    pub fn new(inner: G) -> Self {
        Self { inner, delay: THROTTLE }
    }

    pub fn with_delay(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<G: ExampleGenerator> ExampleGenerator for Throttled<G> {
    fn generate(
        &self,
        level: &str,
        lemma: &str,
        meaning: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerateError> {
        thread::sleep(self.delay);
        self.inner.generate(level, lemma, meaning, count)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Strict list parser
// ─────────────────────────────────────────────────────────────────────────────

/// Parse the capability's free-text output into a list of sentences.
///
/// Accepts a JSON array of strings, or the same list shape with
/// single-quoted items.  Anything else is an explicit parse failure — no
/// best-effort coercion.
pub fn parse_sentence_list(raw: &str) -> Result<Vec<String>, GenerateError> {
    let trimmed = raw.trim();
    if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Ok(list);
    }
    parse_quoted_list(trimmed).ok_or_else(|| GenerateError::Unparseable(raw.to_string()))
}

/// `['a', 'b']`-style list with single- or double-quoted items and
/// backslash escapes.  Returns `None` on any structural violation.
fn parse_quoted_list(s: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        // Skip whitespace up to the next item.
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&quote) = chars.peek() else { break };
        if quote != '\'' && quote != '"' {
            return None;
        }
        chars.next();
        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }
    Some(items)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
