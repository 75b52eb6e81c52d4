//! Word-record JSON model and file I/O.
//!
//! A word record is one dictionary entry: headword, CEFR level and a map
//! of senses, each with optional example usages.  Records are read-only
//! input; [`LemmaPhonetics`] is the per-word output of the transcription
//! pipeline.  `BTreeMap` keeps iteration deterministic so batch output is
//! reproducible.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One sense of a word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meaning {
    #[serde(default)]
    pub meaning: String,
    /// Part of speech.
    #[serde(default)]
    pub pos: String,
    /// Example sentences keyed by example id.
    #[serde(default)]
    pub examples: BTreeMap<String, String>,
}

/// One dictionary entry, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordRecord {
    pub word_id: String,
    /// Headword in citation form.
    pub lemma: String,
    /// CEFR level label (A0, A1, …).
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub meanings: BTreeMap<String, Meaning>,
}

/// Transcription lookup entry, keyed by word id in the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaPhonetics {
    pub tib_word: String,
    /// Empty string when transcription yields nothing.
    pub phon: String,
}

/// Read and parse one word-record file.
pub fn read_word_record(path: &Path) -> Result<WordRecord> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read word record: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse word record: {}", path.display()))
}

/// Write the lemma→phonetics table as pretty-printed UTF-8 JSON.
pub fn write_phonetics_table(
    path: &Path,
    table: &BTreeMap<String, LemmaPhonetics>,
) -> Result<()> {
    let json = serde_json::to_string_pretty(table)
        .context("Failed to serialize phonetics table")?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write phonetics table: {}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
