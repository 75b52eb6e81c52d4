//! # tibphon
//!
//! Tibetan dictionary tooling: phonological transcription of headwords
//! and review-sheet export, ported from an internal dictionary-building
//! pipeline.
//!
//! ## Quick start
//!
//! ```
//! use tibphon::Pipeline;
//!
//! let pipeline = Pipeline::new();
//!
//! // One call: segment, map to phonemes, render for display.
//! let phon = pipeline.text_to_phon("བཀྲ་ཤིས་", "byone", "simple").unwrap();
//! assert_eq!(phon, "ṭa  shi");
//!
//! // Or keep the intermediate streams.
//! let result = pipeline.segment_by_syllable_and_phon("བཀྲ་ཤིས་");
//! println!("{} → {}", result.segmented.trim(), result.ipa.trim());
//! ```
//!
//! Batch transcription of a dictionary tree:
//!
//! ```no_run
//! use std::path::Path;
//! use tibphon::{records, Pipeline};
//!
//! let pipeline = Pipeline::new();
//! let table = pipeline.dictionary_phonetics(Path::new("dictionary")).unwrap();
//! records::write_phonetics_table(Path::new("phonetics.json"), &table).unwrap();
//! ```
//!
//! ## Pipeline
//! 1. **Segmentation** — tsheg-delimited syllables grouped by ones, twos,
//!    or linguistic words (tokenizer capability), grammatical particles
//!    re-attached to their hosts.
//! 2. **Phoneme mapping** — each segment transcribed twice: a romanized
//!    form and an IPA form with tone, aspiration and coda detail.
//! 3. **Rendering** — an ordered substitution cascade simplifies the IPA
//!    stream at one of three display levels (simple / intermediate /
//!    advanced).
//! 4. **Cleanup** — line-break markers and punctuation artifacts removed.
//!
//! Review-sheet export ([`rows`]) is a separate path over the same word
//! records: meanings and examples flattened to CSV rows, with generated
//! example sentences filled in through the [`generate::ExampleGenerator`]
//! capability.

pub mod generate;
pub mod phonology;
pub mod pipeline;
pub mod records;
pub mod render;
pub mod rows;
pub mod segment;
pub mod tokenize;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use phonology::{PhoneticMapper, PhoneticPair};
pub use pipeline::{Phonetics, Pipeline, PipelineError, SegmentMode};
pub use render::{render, Level};
pub use tokenize::{SyllableTokenizer, Tokenizer};
