//! Command-line driver for dictionary batch processing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tibphon::generate::NullGenerator;
use tibphon::records::write_phonetics_table;
use tibphon::rows::{export_review_rows, RowWriter, MAX_WORD_IDS};
use tibphon::Pipeline;

/// Tibetan dictionary phonetics and review-sheet tooling
#[derive(Parser, Debug)]
#[command(name = "tibphon", version, about = "Tibetan dictionary phonetics and review-sheet tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe a single text to a display phonetic string
    Transcribe {
        /// Tibetan text to transcribe
        text: String,

        /// Segmentation mode (word, byone, bytwo)
        #[arg(long, default_value = "byone")]
        mode: String,

        /// Display level (simple, intermediate, advanced)
        #[arg(long, default_value = "simple")]
        level: String,
    },

    /// Build the lemma→phonetics table for a dictionary tree
    Phonetics {
        /// Root directory of word-record batches
        dict_root: PathBuf,

        /// Output JSON file
        #[arg(short, long, default_value = "phonetics.json")]
        output: PathBuf,
    },

    /// Export review-sheet CSV rows for a dictionary tree
    Rows {
        /// Root directory of word-record batches
        dict_root: PathBuf,

        /// Directory for the numbered CSV files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Words per CSV file before rollover
        #[arg(long, default_value_t = MAX_WORD_IDS)]
        max_words: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transcribe { text, mode, level } => {
            let pipeline = Pipeline::new();
            println!("{}", pipeline.text_to_phon(&text, &mode, &level)?);
        }
        Commands::Phonetics { dict_root, output } => {
            let pipeline = Pipeline::new();
            let table = pipeline.dictionary_phonetics(&dict_root)?;
            write_phonetics_table(&output, &table)?;
            println!("{} words → {}", table.len(), output.display());
        }
        Commands::Rows { dict_root, out_dir, max_words } => {
            // Example generation needs an external oracle; the CLI exports
            // with the AI-example column left empty.
            let mut writer = RowWriter::with_max_word_ids(&out_dir, max_words)?;
            let exported = export_review_rows(&dict_root, &NullGenerator, &mut writer)?;
            println!("{exported} words exported to {}", out_dir.display());
        }
    }

    Ok(())
}
