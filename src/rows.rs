//! Review-row extraction and incremental CSV export.
//!
//! Flattens word records into tabular rows for human review: one row per
//! (meaning, example), with an AI-generated counterpart sentence next to
//! each original example and a generated stand-in where a meaning has no
//! examples at all.  Word ID, lemma and level appear only on each word's
//! first row so the sheet reads grouped.  [`RowWriter`] appends rows as
//! they are produced and rolls over to a fresh numbered file after a
//! fixed number of words, keeping individual review sheets small.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::generate::ExampleGenerator;
use crate::pipeline::sorted_entries;
use crate::records::{read_word_record, WordRecord};

/// Column titles, in row field order.
pub const HEADERS: [&str; 10] = [
    "Word ID",
    "མ་ཚིག",
    "Meaning ID",
    "འགྲེལ་བ།",
    "དཔེར་བརྗོད་ཚིག་སྒྲུབ།",
    "རིག་ནུས་དཔེར་བརྗོད་ཚིག་སྒྲུབ།",
    "བརྡ་སྤྲོད་ཀྱི་དབྱེ་བ།",
    "གནས་ཚད།",
    "ཞུ་དག་པ།",
    "གཏན་འབེབས།",
];

/// CEFR levels that go out for review.
pub const REVIEW_LEVELS: [&str; 3] = ["A0", "A1", "A2"];

/// Default number of words per output file before rollover.
pub const MAX_WORD_IDS: usize = 200;

/// One review-sheet row.  All fields are display strings; empty means the
/// cell is intentionally blank (repeated word fields, reviewer columns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewRow {
    pub word_id: String,
    pub lemma: String,
    pub meaning_id: String,
    pub meaning: String,
    pub example: String,
    pub ai_example: String,
    pub pos: String,
    pub level: String,
    /// Reviewer sign-off, always blank on export.
    pub reviewed: String,
    /// Finalization flag, always blank on export.
    pub finalized: String,
}

impl ReviewRow {
    fn as_record(&self) -> [&str; 10] {
        [
            &self.word_id,
            &self.lemma,
            &self.meaning_id,
            &self.meaning,
            &self.example,
            &self.ai_example,
            &self.pos,
            &self.level,
            &self.reviewed,
            &self.finalized,
        ]
    }
}

/// Whitespace word count of an example, floored at one so the generation
/// request is never for zero sentences.
pub fn sentence_count(example: &str) -> usize {
    example.split_whitespace().count().max(1)
}

/// Flatten one word record into review rows, filling the AI-example
/// column from `generator`.  A generation failure is diagnosed and leaves
/// the cell empty; the row is still produced.
pub fn extract_rows(record: &WordRecord, generator: &dyn ExampleGenerator) -> Vec<ReviewRow> {
    let mut rows = Vec::new();
    let mut first = true;
    for (meaning_id, meaning) in &record.meanings {
        let counts: Vec<(String, usize)> = if meaning.examples.is_empty() {
            vec![(String::new(), 1)]
        } else {
            meaning
                .examples
                .values()
                .map(|ex| (ex.clone(), sentence_count(ex)))
                .collect()
        };
        for (example, count) in counts {
            let ai_example = match generator.generate(
                &record.level,
                &record.lemma,
                &meaning.meaning,
                count,
            ) {
                Ok(sentences) => sentences.join(", "),
                Err(e) => {
                    eprintln!("no AI example for {}/{meaning_id}: {e}", record.word_id);
                    String::new()
                }
            };
            rows.push(ReviewRow {
                word_id: if first { record.word_id.clone() } else { String::new() },
                lemma: if first { record.lemma.clone() } else { String::new() },
                meaning_id: meaning_id.clone(),
                meaning: meaning.meaning.clone(),
                example,
                ai_example,
                pos: meaning.pos.clone(),
                level: if first { record.level.clone() } else { String::new() },
                ..ReviewRow::default()
            });
            first = false;
        }
    }
    rows
}

// ─────────────────────────────────────────────────────────────────────────────
// CSV writer
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental CSV writer with file rollover.
///
/// Rows are appended to `dictionary_entries_{n}.csv` under the output
/// directory; after `max_word_ids` words the writer moves on to the next
/// numbered file.  Headers are written only when a file starts empty, so
/// re-running an interrupted export appends instead of corrupting.
pub struct RowWriter {
    out_dir: PathBuf,
    max_word_ids: usize,
    file_index: usize,
    words_in_file: usize,
    writer: csv::Writer<File>,
}

impl RowWriter {
    pub fn new(out_dir: &Path) -> Result<Self> {
        Self::with_max_word_ids(out_dir, MAX_WORD_IDS)
    }

    pub fn with_max_word_ids(out_dir: &Path, max_word_ids: usize) -> Result<Self> {
        let writer = open_sheet(out_dir, 1)?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            max_word_ids,
            file_index: 1,
            words_in_file: 0,
            writer,
        })
    }

    /// Append all rows of one word, rolling over first if the current
    /// file is full.
    pub fn write_word(&mut self, rows: &[ReviewRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        if self.words_in_file >= self.max_word_ids {
            self.writer.flush().context("Failed to flush review sheet")?;
            self.file_index += 1;
            self.writer = open_sheet(&self.out_dir, self.file_index)?;
            self.words_in_file = 0;
        }
        for row in rows {
            self.writer
                .write_record(row.as_record())
                .context("Failed to write review row")?;
        }
        self.words_in_file += 1;
        self.writer.flush().context("Failed to flush review sheet")
    }
}

fn open_sheet(out_dir: &Path, index: usize) -> Result<csv::Writer<File>> {
    let path = out_dir.join(format!("dictionary_entries_{index}.csv"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Cannot open review sheet: {}", path.display()))?;
    let fresh = file
        .metadata()
        .with_context(|| format!("Cannot stat review sheet: {}", path.display()))?
        .len()
        == 0;
    let mut writer = csv::Writer::from_writer(file);
    if fresh {
        writer
            .write_record(HEADERS)
            .context("Failed to write review sheet headers")?;
    }
    Ok(writer)
}

/// Export review rows for every record in a dictionary tree.
///
/// Walks subdirectories and files in sorted order, keeps only records at
/// the [`REVIEW_LEVELS`], and appends their rows through `writer`.
/// Unreadable files are diagnosed and skipped.  Returns the number of
/// words exported.
pub fn export_review_rows(
    root: &Path,
    generator: &dyn ExampleGenerator,
    writer: &mut RowWriter,
) -> Result<usize> {
    let mut exported = 0;
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
            if !REVIEW_LEVELS.contains(&record.level.as_str()) {
                continue;
            }
            writer.write_word(&extract_rows(&record, generator))?;
            exported += 1;
        }
    }
    Ok(exported)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateError, NullGenerator};
    use crate::records::Meaning;
    use std::collections::BTreeMap;
    use std::fs;

    struct FixedGenerator(&'static str);

    impl ExampleGenerator for FixedGenerator {
        fn generate(
            &self,
            _level: &str,
            _lemma: &str,
            _meaning: &str,
            count: usize,
        ) -> Result<Vec<String>, GenerateError> {
            Ok(vec![self.0.to_string(); count])
        }
    }

    struct FailingGenerator;

    impl ExampleGenerator for FailingGenerator {
        fn generate(
            &self,
            _level: &str,
            _lemma: &str,
            _meaning: &str,
            _count: usize,
        ) -> Result<Vec<String>, GenerateError> {
            Err(GenerateError::Capability("offline".into()))
        }
    }

    fn record_with_examples() -> WordRecord {
        let mut examples = BTreeMap::new();
        examples.insert("e1".to_string(), "བཀྲ་ཤིས་ བདེ་ལེགས།".to_string());
        examples.insert("e2".to_string(), "ཁ".to_string());
        let mut meanings = BTreeMap::new();
        meanings.insert(
            "m1".to_string(),
            Meaning {
                meaning: "good fortune".into(),
                pos: "noun".into(),
                examples,
            },
        );
        meanings.insert(
            "m2".to_string(),
            Meaning { meaning: "greeting".into(), pos: "intj".into(), ..Meaning::default() },
        );
        WordRecord {
            word_id: "w1".into(),
            lemma: "བཀྲ་ཤིས་".into(),
            level: "A1".into(),
            meanings,
        }
    }

    #[test]
    fn test_sentence_count() {
        assert_eq!(sentence_count("བཀྲ་ཤིས་ བདེ་ལེགས།"), 2);
        assert_eq!(sentence_count("one"), 1);
        assert_eq!(sentence_count(""), 1);
    }

    #[test]
    fn test_extract_rows_grouping() {
        let rows = extract_rows(&record_with_examples(), &NullGenerator);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].word_id, "w1");
        assert_eq!(rows[0].level, "A1");
        assert_eq!(rows[1].word_id, "");
        assert_eq!(rows[1].lemma, "");
        assert_eq!(rows[2].meaning_id, "m2");
    }

    #[test]
    fn test_extract_rows_generates_for_empty_meaning() {
        let rows = extract_rows(&record_with_examples(), &FixedGenerator("ཨ།"));
        // Two-word example asks for two sentences, comma-joined in the cell.
        assert_eq!(rows[0].ai_example, "ཨ།, ཨ།");
        // A meaning without examples still gets one generated row.
        assert_eq!(rows[2].example, "");
        assert_eq!(rows[2].ai_example, "ཨ།");
    }

    #[test]
    fn test_extract_rows_survives_generator_failure() {
        let rows = extract_rows(&record_with_examples(), &FailingGenerator);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.ai_example.is_empty()));
    }

    #[test]
    fn test_writer_headers_and_rollover() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RowWriter::with_max_word_ids(dir.path(), 1).unwrap();
        let rows = extract_rows(&record_with_examples(), &NullGenerator);
        writer.write_word(&rows).unwrap();
        writer.write_word(&rows).unwrap();

        for index in 1..=2 {
            let path = dir.path().join(format!("dictionary_entries_{index}.csv"));
            let content = fs::read_to_string(&path).unwrap();
            assert!(content.starts_with("Word ID,"), "{index}: {content:?}");
            assert!(content.contains("w1"));
        }
    }

    #[test]
    fn test_writer_appends_without_duplicate_headers() {
        let dir = tempfile::tempdir().unwrap();
        let rows = extract_rows(&record_with_examples(), &NullGenerator);
        {
            let mut writer = RowWriter::new(dir.path()).unwrap();
            writer.write_word(&rows).unwrap();
        }
        {
            let mut writer = RowWriter::new(dir.path()).unwrap();
            writer.write_word(&rows).unwrap();
        }
        let content =
            fs::read_to_string(dir.path().join("dictionary_entries_1.csv")).unwrap();
        assert_eq!(content.matches("Word ID").count(), 1);
    }

    #[test]
    fn test_export_filters_levels() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch_001");
        fs::create_dir(&batch).unwrap();
        fs::write(
            batch.join("a1.json"),
            r#"{"word_id": "w1", "lemma": "ཀ", "level": "A1",
                "meanings": {"m1": {"meaning": "ka"}}}"#,
        )
        .unwrap();
        fs::write(
            batch.join("b1.json"),
            r#"{"word_id": "w2", "lemma": "ཁ", "level": "B1",
                "meanings": {"m1": {"meaning": "kha"}}}"#,
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        let mut writer = RowWriter::new(out.path()).unwrap();
        let exported = export_review_rows(dir.path(), &NullGenerator, &mut writer).unwrap();
        assert_eq!(exported, 1);
        let content =
            fs::read_to_string(out.path().join("dictionary_entries_1.csv")).unwrap();
        assert!(content.contains("w1"));
        assert!(!content.contains("w2"));
    }
}
