//! Word/syllable tokenization boundary.
//!
//! Word-mode segmentation delegates to an external tokenizer capability
//! behind the [`Tokenizer`] trait: given raw text it returns ordered,
//! non-overlapping token spans.  Spans need not cover the whole input —
//! characters between tokens (plain whitespace, Latin noise) may be
//! silently skipped, so callers must slice strictly by span.
//!
//! [`SyllableTokenizer`] is the built-in implementation: a dictionary-less
//! chunker that yields one token per syllable (trailing tsheg included)
//! plus punctuation tokens, in the style of botok's simple tokenizer.

use thiserror::Error;

/// Coarse lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// Syllable or word content.
    Text,
    /// Tibetan punctuation (shad, yig-mgo, brackets…).
    Punct,
}

/// A half-open byte span into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
    pub category: TokenCategory,
}

impl Token {
    /// Slice the source text this token was produced from.  `None` when the
    /// span is out of range or off a char boundary — external tokenizers may
    /// misbehave, and a bad span must not abort the caller.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// Tokenizer failure.  The capability is external; any failure is reported
/// here and degraded by the caller, never propagated as fatal.
#[derive(Debug, Error)]
#[error("tokenizer failed: {0}")]
pub struct TokenizeError(pub String);

/// External word/syllable segmentation capability.
pub trait Tokenizer {
    /// Tokenize `text` into ordered, non-overlapping spans.
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Character classes
// ─────────────────────────────────────────────────────────────────────────────

/// Tsheg — the syllable delimiter.
pub const TSHEG: char = '\u{0F0B}';
const TSHEG_BAR: char = '\u{0F0C}';

fn is_tsheg(c: char) -> bool {
    c == TSHEG || c == TSHEG_BAR
}

/// Letters, vowel signs, subjoined letters and combining marks — anything
/// that belongs inside a syllable.
pub(crate) fn is_syllable_char(c: char) -> bool {
    matches!(c, '\u{0F40}'..='\u{0FBC}')
        || matches!(c, '\u{0F71}'..='\u{0F84}')
        || c == '\u{0F35}'
        || c == '\u{0F37}'
}

/// Shad and the other script punctuation/boundary marks.
pub(crate) fn is_punct_char(c: char) -> bool {
    matches!(c, '\u{0F01}'..='\u{0F0A}')
        || matches!(c, '\u{0F0D}'..='\u{0F17}')
        || matches!(c, '\u{0F3A}'..='\u{0F3D}')
}

// ─────────────────────────────────────────────────────────────────────────────
// SyllableTokenizer
// ─────────────────────────────────────────────────────────────────────────────

/// Dictionary-less syllable tokenizer.
///
/// Splits the input into per-syllable [`Token`]s (each syllable keeps its
/// trailing tsheg) and punctuation tokens.  Characters that are neither
/// syllable-forming nor Tibetan punctuation are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyllableTokenizer;

impl SyllableTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for SyllableTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut iter = text.char_indices().peekable();

        while let Some(&(start, c)) = iter.peek() {
            if is_syllable_char(c) {
                // One syllable: letters/marks up to and including the tsheg
                // run that terminates it.
                let mut end = start;
                while let Some(&(i, c)) = iter.peek() {
                    if is_syllable_char(c) {
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                while let Some(&(i, c)) = iter.peek() {
                    if is_tsheg(c) {
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token { start, end, category: TokenCategory::Text });
            } else if is_punct_char(c) {
                let mut end = start;
                while let Some(&(i, c)) = iter.peek() {
                    if is_punct_char(c) {
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token { start, end, category: TokenCategory::Punct });
            } else {
                // Inter-token character — skipped, not covered by any span.
                iter.next();
            }
        }

        Ok(tokens)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
