//! Whitespace tokenizer feeding both training and text scoring.
//!
//! Splitting is always on Unicode whitespace. Two optional steps can be
//! layered on top:
//! - lowercasing every token
//! - wrapping each sentence in `<s>` / `</s>` markers so sentence-initial
//!   words have a context of full length

use serde::{Deserialize, Serialize};

/// Marker prepended `order - 1` times when sentence markers are enabled.
pub const START_MARKER: &str = "<s>";
/// Marker appended once when sentence markers are enabled.
pub const END_MARKER: &str = "</s>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    pub lowercase: bool,
    pub sentence_markers: bool,
}

impl Tokenizer {
    pub fn new(lowercase: bool, sentence_markers: bool) -> Self {
        Self {
            lowercase,
            sentence_markers,
        }
    }

    /// Split an n-gram query such as `"el gato"`.
    ///
    /// Lowercasing applies as for sentences, but markers are never added:
    /// a fragment is not a full sentence.
    pub fn tokenize_fragment(&self, fragment: &str) -> Vec<String> {
        fragment
            .split_whitespace()
            .map(|w| {
                if self.lowercase {
                    w.to_lowercase()
                } else {
                    w.to_string()
                }
            })
            .collect()
    }

    /// Split a sentence into tokens for a model of the given order.
    ///
    /// A blank sentence yields no tokens even with markers enabled, so
    /// empty lines never contribute marker-only n-grams.
    pub fn tokenize(&self, sentence: &str, order: usize) -> Vec<String> {
        let mut tokens = self.tokenize_fragment(sentence);
        if !self.sentence_markers || tokens.is_empty() {
            return tokens;
        }

        let padding = order.saturating_sub(1);
        let mut padded = Vec::with_capacity(tokens.len() + padding + 1);
        padded.extend(std::iter::repeat(START_MARKER.to_string()).take(padding));
        padded.append(&mut tokens);
        padded.push(END_MARKER.to_string());
        padded
    }
}
