//! Frequency tables behind the Kneser-Ney estimate.
//!
//! Training goes through [`CountTablesBuilder`]: sentences are fed one at a
//! time, then [`CountTablesBuilder::build`] derives the continuation and
//! context tables and freezes everything into an immutable [`CountTables`].
//!
//! # Tables
//!
//! - unigram counts: token → occurrences
//! - n-gram counts: order → (n-gram → occurrences), only the configured
//!   order is populated
//! - continuation counts: suffix `ngram[1..]` → distinct n-grams ending in it
//! - context counts: prefix `ngram[..n-1]` → distinct n-grams starting with it
//!
//! Windows never cross sentence boundaries and a sentence shorter than the
//! order contributes unigrams but no n-grams.

use crate::error::{validate_order, KneserNeyError};
use ahash::{AHashMap, AHashSet};

/// An ordered tuple of tokens.
pub type Ngram = Vec<String>;

/// Immutable count tables for a single model order.
#[derive(Debug, Clone)]
pub struct CountTables {
    order: usize,
    /// Counts of single tokens across the whole corpus.
    unigram_counts: AHashMap<String, u64>,
    /// Counts of n-grams keyed by their length.
    ngram_counts: AHashMap<usize, AHashMap<Ngram, u64>>,
    /// Distinct order-n n-grams sharing each suffix.
    continuation_counts: AHashMap<Ngram, u64>,
    /// Distinct order-n n-grams sharing each prefix.
    context_counts: AHashMap<Ngram, u64>,
    vocabulary: AHashSet<String>,
    total_unigrams: u64,
    total_ngrams: u64,
}

/// Accumulates raw counts sentence by sentence.
#[derive(Debug)]
pub struct CountTablesBuilder {
    order: usize,
    unigram_counts: AHashMap<String, u64>,
    ngram_counts: AHashMap<Ngram, u64>,
    total_unigrams: u64,
    total_ngrams: u64,
}

impl CountTables {
    /// Start counting n-grams of the given order.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if `order < 1`.
    pub fn builder(order: usize) -> Result<CountTablesBuilder, KneserNeyError> {
        validate_order(order)?;
        Ok(CountTablesBuilder {
            order,
            unigram_counts: AHashMap::new(),
            ngram_counts: AHashMap::new(),
            total_unigrams: 0,
            total_ngrams: 0,
        })
    }

    /// Length of the counted n-grams.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Occurrences of `token` across the corpus, 0 if unseen.
    pub fn unigram_count(&self, token: &str) -> u64 {
        self.unigram_counts.get(token).copied().unwrap_or(0)
    }

    /// Raw occurrences of an exact n-gram, 0 if it was never counted.
    pub fn ngram_count(&self, ngram: &[String]) -> u64 {
        self.ngram_counts
            .get(&ngram.len())
            .and_then(|table| table.get(ngram))
            .copied()
            .unwrap_or(0)
    }

    /// Distinct order-n n-grams whose first token removed gives `suffix`.
    pub fn continuation_count(&self, suffix: &[String]) -> u64 {
        self.continuation_counts.get(suffix).copied().unwrap_or(0)
    }

    /// Distinct order-n n-grams whose last token removed gives `prefix`.
    pub fn context_count(&self, prefix: &[String]) -> u64 {
        self.context_counts.get(prefix).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams of the configured order.
    pub fn distinct_ngrams(&self) -> usize {
        self.ngram_counts.get(&self.order).map_or(0, |table| table.len())
    }

    /// Distinct tokens seen during training.
    pub fn vocabulary(&self) -> &AHashSet<String> {
        &self.vocabulary
    }

    /// Total token count; the unigram denominator.
    pub fn total_unigrams(&self) -> u64 {
        self.total_unigrams
    }

    /// Total order-n windows; the continuation denominator.
    pub fn total_ngrams(&self) -> u64 {
        self.total_ngrams
    }
}

impl CountTablesBuilder {
    pub fn order(&self) -> usize {
        self.order
    }

    /// Count the tokens and n-gram windows of one sentence.
    pub fn add_sentence<S: AsRef<str>>(&mut self, tokens: &[S]) {
        for token in tokens {
            *self
                .unigram_counts
                .entry(token.as_ref().to_string())
                .or_insert(0) += 1;
            self.total_unigrams += 1;
        }

        // windows() yields nothing when the sentence is shorter than the order
        for window in tokens.windows(self.order) {
            let ngram: Ngram = window.iter().map(|t| t.as_ref().to_string()).collect();
            *self.ngram_counts.entry(ngram).or_insert(0) += 1;
            self.total_ngrams += 1;
        }
    }

    /// Derive the continuation and context tables and freeze the counts.
    ///
    /// # Errors
    /// Returns `EmptyCorpus` if no n-gram of the configured order was seen.
    pub fn build(self) -> Result<CountTables, KneserNeyError> {
        if self.total_ngrams == 0 {
            return Err(KneserNeyError::EmptyCorpus { order: self.order });
        }

        let mut continuation_counts: AHashMap<Ngram, u64> = AHashMap::new();
        let mut context_counts: AHashMap<Ngram, u64> = AHashMap::new();
        // One increment per distinct n-gram type, not per occurrence
        for ngram in self.ngram_counts.keys() {
            *continuation_counts.entry(ngram[1..].to_vec()).or_insert(0) += 1;
            *context_counts
                .entry(ngram[..ngram.len() - 1].to_vec())
                .or_insert(0) += 1;
        }

        let vocabulary: AHashSet<String> = self.unigram_counts.keys().cloned().collect();

        log::info!(
            "Counted {} tokens ({} distinct), {} {}-grams ({} distinct)",
            self.total_unigrams,
            vocabulary.len(),
            self.total_ngrams,
            self.order,
            self.ngram_counts.len()
        );

        let mut ngram_counts = AHashMap::new();
        ngram_counts.insert(self.order, self.ngram_counts);

        Ok(CountTables {
            order: self.order,
            unigram_counts: self.unigram_counts,
            ngram_counts,
            continuation_counts,
            context_counts,
            vocabulary,
            total_unigrams: self.total_unigrams,
            total_ngrams: self.total_ngrams,
        })
    }
}
