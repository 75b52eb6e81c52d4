//! Pipeline orchestrator — segmentation → phoneme mapping → rendering.
//!
//! A [`Pipeline`] owns the two configured phonetic tables and the
//! tokenizer capability, and composes one segmentation strategy with the
//! mapper per call.  [`Pipeline::text_to_phon`] is the whole pipeline in
//! one call: validate arguments, segment, map, render, clean up.
//! [`Pipeline::dictionary_phonetics`] batch-drives it over a directory
//! tree of word records in deterministic (sorted) order.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::phonology::PhoneticMapper;
use crate::records::{read_word_record, LemmaPhonetics};
use crate::render::{render, InvalidLevel, Level};
use crate::segment::{segment_by_pair, segment_by_syllable, segment_words};
use crate::tokenize::{SyllableTokenizer, Tokenizer};

/// Segmentation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentMode {
    /// Linguistic words via the tokenizer capability.
    Word,
    /// One syllable per token.
    #[default]
    ByOne,
    /// Two syllables per token.
    ByTwo,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::Word => "word",
            SegmentMode::ByOne => "byone",
            SegmentMode::ByTwo => "bytwo",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid-argument condition: unrecognized segmentation mode.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("segment mode '{0}' is invalid, valid modes are word, byone, bytwo")]
pub struct InvalidSegmentMode(pub String);

impl FromStr for SegmentMode {
    type Err = InvalidSegmentMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(SegmentMode::Word),
            "byone" => Ok(SegmentMode::ByOne),
            "bytwo" => Ok(SegmentMode::ByTwo),
            other => Err(InvalidSegmentMode(other.to_string())),
        }
    }
}

/// Invalid pipeline arguments, surfaced immediately and never recovered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Level(#[from] InvalidLevel),
    #[error(transparent)]
    SegmentMode(#[from] InvalidSegmentMode),
}

/// Segmented text plus its two parallel phonetic streams.
#[derive(Debug, Clone)]
pub struct Phonetics {
    pub segmented: String,
    pub kvp: String,
    pub ipa: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// The transcription pipeline.  Construct once; all state is read-only
/// after construction, so shared references are safe across threads.
pub struct Pipeline {
    mapper: PhoneticMapper,
    tokenizer: Box<dyn Tokenizer + Send + Sync>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with the built-in syllable tokenizer.
    pub fn new() -> Self {
        Self::with_tokenizer(Box::new(SyllableTokenizer::new()))
    }

    /// Pipeline with an external tokenizer capability.
    pub fn with_tokenizer(tokenizer: Box<dyn Tokenizer + Send + Sync>) -> Self {
        Self { mapper: PhoneticMapper::new(), tokenizer }
    }

    fn with_phonetics(&self, segmented: String) -> Phonetics {
        let pair = self.mapper.map(&segmented);
        Phonetics { segmented, kvp: pair.kvp, ipa: pair.ipa }
    }

    /// Word-mode segmentation composed with the phoneme mapper.
    pub fn segment_and_phon(&self, text: &str) -> Phonetics {
        self.with_phonetics(segment_words(text, self.tokenizer.as_ref()))
    }

    /// Per-syllable segmentation composed with the phoneme mapper.
    pub fn segment_by_syllable_and_phon(&self, text: &str) -> Phonetics {
        self.with_phonetics(segment_by_syllable(text))
    }

    /// Per-pair segmentation composed with the phoneme mapper.
    pub fn segment_by_pair_and_phon(&self, text: &str) -> Phonetics {
        self.with_phonetics(segment_by_pair(text))
    }

    /// Phoneme-map text that is already segmented.
    pub fn phon(&self, segmented: &str) -> Phonetics {
        self.with_phonetics(segmented.to_string())
    }

    /// Full pipeline with string arguments, validated here: segment `text`
    /// under `mode`, map, render at `level`, then strip the line-break
    /// markers, collapse lone-dot tokens and trim.
    pub fn text_to_phon(
        &self,
        text: &str,
        mode: &str,
        level: &str,
    ) -> Result<String, PipelineError> {
        let level = Level::from_str(level)?;
        let mode = SegmentMode::from_str(mode)?;
        Ok(self.text_to_phon_with(text, mode, level))
    }

    /// Full pipeline with typed arguments.
    pub fn text_to_phon_with(&self, text: &str, mode: SegmentMode, level: Level) -> String {
        let result = match mode {
            SegmentMode::ByOne => self.segment_by_syllable_and_phon(text),
            SegmentMode::ByTwo => self.segment_by_pair_and_phon(text),
            SegmentMode::Word => self.segment_and_phon(text),
        };
        let phon = render(&result.ipa, level);
        let phon = phon.replace("<br/>", "");
        // A lone dot is the rendering of a punctuation-only token.
        let phon = phon.replace(" . ", " ");
        phon.trim().to_string()
    }

    // ── Batch driving ─────────────────────────────────────────────────────────

    /// Build the lemma→phonetics lookup table for a dictionary tree.
    ///
    /// Iterates subdirectories of `root` in sorted name order, then files
    /// within each in sorted order, transcribing every record's lemma with
    /// default mode and level.  A record whose transcription is empty still
    /// gets an entry with an empty `phon`.  Unreadable or unparseable files
    /// are diagnosed and skipped; the batch never aborts.
    pub fn dictionary_phonetics(
        &self,
        root: &Path,
    ) -> Result<BTreeMap<String, LemmaPhonetics>> {
        let mut table = BTreeMap::new();
        for dir in sorted_entries(root)? {
            if !dir.is_dir() {
                continue;
            }
            for file in sorted_entries(&dir)? {
                let record = match read_word_record(&file) {
                    Ok(record) => record,
                    Err(e) => {
                        eprintln!("skipping {}: {e:#}", file.display());
                        continue;
                    }
                };
                let phon = self.text_to_phon_with(
                    &record.lemma,
                    SegmentMode::default(),
                    Level::default(),
                );
                table.insert(
                    record.word_id,
                    LemmaPhonetics { tib_word: record.lemma, phon },
                );
            }
        }
        Ok(table)
    }
}

pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("byone".parse::<SegmentMode>().unwrap(), SegmentMode::ByOne);
        assert_eq!("word".parse::<SegmentMode>().unwrap(), SegmentMode::Word);
        let err = "chunk".parse::<SegmentMode>().unwrap_err();
        assert!(err.to_string().contains("word, byone, bytwo"));
    }

    #[test]
    fn test_text_to_phon_invalid_mode() {
        let pipeline = Pipeline::new();
        let err = pipeline.text_to_phon("ཀ", "invalid", "simple").unwrap_err();
        assert!(err.to_string().contains("word, byone, bytwo"), "got: {err}");
    }

    #[test]
    fn test_text_to_phon_invalid_level() {
        let pipeline = Pipeline::new();
        let err = pipeline.text_to_phon("ཀ", "byone", "expert").unwrap_err();
        assert!(
            err.to_string().contains("simple, intermediate, advanced"),
            "got: {err}"
        );
    }

    #[test]
    fn test_text_to_phon_basic() {
        let pipeline = Pipeline::new();
        let phon = pipeline.text_to_phon("བཀྲ་ཤིས་", "byone", "simple").unwrap();
        assert_eq!(phon, "ṭa  shi");
    }

    #[test]
    fn test_byone_phonetics_tokens() {
        let pipeline = Pipeline::new();
        let result = pipeline.segment_by_syllable_and_phon("བཀྲ་ཤིས་");
        assert_eq!(result.segmented, "བཀྲ་ ཤིས་ \n");
        let ipa: Vec<&str> = result.ipa.split_whitespace().collect();
        let kvp: Vec<&str> = result.kvp.split_whitespace().collect();
        assert_eq!(ipa.len(), 2, "ipa: {:?}", result.ipa);
        assert_eq!(kvp.len(), 2, "kvp: {:?}", result.kvp);
    }

    #[test]
    fn test_shad_collapses_to_single_space() {
        let pipeline = Pipeline::new();
        let phon = pipeline.text_to_phon("བཀྲ་ཤིས།", "word", "simple").unwrap();
        assert!(!phon.contains('.'), "got: {phon:?}");
        assert!(!phon.is_empty());
    }

    #[test]
    fn test_non_tibetan_transcribes_empty() {
        let pipeline = Pipeline::new();
        let phon = pipeline.text_to_phon("hello", "byone", "simple").unwrap();
        assert_eq!(phon, "");
    }

    #[test]
    fn test_dictionary_phonetics_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch_001");
        fs::create_dir(&batch).unwrap();
        fs::write(
            batch.join("w1.json"),
            r#"{"word_id": "w1", "lemma": "བཀྲ་ཤིས་"}"#,
        )
        .unwrap();
        fs::write(
            batch.join("w2.json"),
            r#"{"word_id": "w2", "lemma": "xyz"}"#,
        )
        .unwrap();

        let pipeline = Pipeline::new();
        let table = pipeline.dictionary_phonetics(dir.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table["w1"].phon.is_empty());
        // Empty transcription still gets an entry.
        assert_eq!(table["w2"].phon, "");
        assert_eq!(table["w2"].tib_word, "xyz");
    }

    #[test]
    fn test_dictionary_phonetics_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch_001");
        fs::create_dir(&batch).unwrap();
        fs::write(batch.join("bad.json"), "not json").unwrap();
        fs::write(
            batch.join("good.json"),
            r#"{"word_id": "w1", "lemma": "ཀ"}"#,
        )
        .unwrap();

        let pipeline = Pipeline::new();
        let table = pipeline.dictionary_phonetics(dir.path()).unwrap();
        assert_eq!(table.len(), 1);
    }
}
