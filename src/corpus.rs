//! Corpus loading for training.
//!
//! # Corpus Format
//!
//! Corpus files hold one sentence per line:
//! ```text
//! # Comments start with #
//! el gato come pescado
//! el perro come carne
//! ```
//!
//! Blank lines and comment lines are skipped. Tokenization happens later,
//! in the model, so the loader only hands back trimmed lines.
//!
//! # Fallback Corpus
//!
//! When no corpus file is given and none exists at the default location,
//! a small built-in Spanish corpus is used so the demo always has data.

use crate::error::KneserNeyError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const BUILTIN_CORPUS: [&str; 5] = [
    "el gato come pescado",
    "el perro come carne",
    "el gato duerme",
    "el perro ladra",
    "el perro come pescado",
];

/// Read sentences from a corpus file.
///
/// # Errors
/// Returns `Io` if the file cannot be opened or read.
pub fn load_corpus(path: &Path) -> Result<Vec<String>, KneserNeyError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut sentences = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        sentences.push(line.to_string());
    }

    log::info!("Loaded {} sentences from {}", sentences.len(), path.display());
    Ok(sentences)
}

pub fn builtin_corpus() -> Vec<String> {
    BUILTIN_CORPUS.iter().map(|s| s.to_string()).collect()
}

/// `<data dir>/kneser-ney/corpus.txt`, or `corpus.txt` in the current
/// directory when the platform has no data directory.
pub fn default_corpus_path() -> PathBuf {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push("kneser-ney");
            path.push("corpus.txt");
            path
        }
        None => PathBuf::from("corpus.txt"),
    }
}

/// Pick the corpus to train on: an explicit path, else the default
/// location if it exists, else the built-in corpus.
pub fn resolve_corpus(path: Option<&Path>) -> Result<Vec<String>, KneserNeyError> {
    if let Some(path) = path {
        return load_corpus(path);
    }

    let default_path = default_corpus_path();
    if default_path.exists() {
        return load_corpus(&default_path);
    }

    log::info!("No corpus file found; using built-in corpus");
    Ok(builtin_corpus())
}
