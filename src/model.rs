//! Interpolated Kneser-Ney probability engine and sentence scorer.
//!
//! # Recursion
//!
//! For an n-gram `w1 .. wk` the estimate is computed top-down:
//! - `k == 1`: plain relative frequency `c(w) / N`, never discounted
//! - unseen context: continuation probability of the last word
//! - otherwise:
//!   `max(c(w1..wk) - D, 0) / ctx(w1..wk-1) + D * P(w2..wk) / ctx(w1..wk-1)`
//!
//! `ctx` is the number of distinct continuations of a prefix at the trained
//! order, so the second term hands `D` of mass per continuation to the
//! lower-order estimate. Lower orders reuse the top-order context and
//! continuation tables rather than keeping a table per order.
//!
//! # Usage
//!
//! ```rust
//! use kneser_ney::KneserNey;
//!
//! let corpus = vec![
//!     vec!["el", "gato", "come"],
//!     vec!["el", "perro", "come"],
//! ];
//! let model = KneserNey::new(&corpus, 2, 0.75)?;
//! let p = model.probability(&["el", "gato"])?;
//! assert!(p > 0.0 && p <= 1.0);
//! # Ok::<(), kneser_ney::KneserNeyError>(())
//! ```

use crate::counts::CountTables;
use crate::error::{validate_discount, KneserNeyError};
use crate::tokenizer::Tokenizer;
use ahash::AHashSet;

/// How a single probability was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// Relative frequency of a single token.
    Unigram { probability: f64 },
    /// The prefix was never a context, so only the last word's
    /// continuation count is used.
    Continuation { probability: f64 },
    /// Discounted frequency plus the mass handed to the lower order.
    Interpolated {
        discounted: f64,
        backoff: f64,
        lower_order: f64,
    },
}

impl Estimate {
    pub fn probability(&self) -> f64 {
        match *self {
            Estimate::Unigram { probability } | Estimate::Continuation { probability } => {
                probability
            }
            Estimate::Interpolated {
                discounted,
                backoff,
                ..
            } => discounted + backoff,
        }
    }
}

/// A trained interpolated Kneser-Ney model of fixed order.
///
/// All tables are built in the constructor and never change afterwards,
/// so a model can be shared between threads and queried concurrently.
#[derive(Debug, Clone)]
pub struct KneserNey {
    tables: CountTables,
    discount: f64,
    tokenizer: Tokenizer,
}

impl KneserNey {
    /// Train a model on pre-tokenized sentences.
    ///
    /// # Errors
    /// - `InvalidConfiguration` if `order < 1` or `discount` is outside `(0, 1)`
    /// - `EmptyCorpus` if no sentence is at least `order` tokens long
    pub fn new<S: AsRef<str>>(
        corpus: &[Vec<S>],
        order: usize,
        discount: f64,
    ) -> Result<Self, KneserNeyError> {
        validate_discount(discount)?;

        let mut builder = CountTables::builder(order)?;
        for sentence in corpus {
            builder.add_sentence(sentence);
        }

        Ok(Self {
            tables: builder.build()?,
            discount,
            tokenizer: Tokenizer::default(),
        })
    }

    /// Train a model on raw text lines, one sentence per line.
    ///
    /// The tokenizer is kept so that [`KneserNey::text_probability`]
    /// splits queries the same way the corpus was split.
    pub fn from_text<I, S>(
        lines: I,
        order: usize,
        discount: f64,
        tokenizer: Tokenizer,
    ) -> Result<Self, KneserNeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_discount(discount)?;

        let mut builder = CountTables::builder(order)?;
        for line in lines {
            let tokens = tokenizer.tokenize(line.as_ref(), order);
            builder.add_sentence(&tokens);
        }

        Ok(Self {
            tables: builder.build()?,
            discount,
            tokenizer,
        })
    }

    /// Length of the n-grams the model was trained on.
    pub fn order(&self) -> usize {
        self.tables.order()
    }

    /// The discount `D` shared by every recursion level.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// The tokenizer used for training and for text queries.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Read-only view of the count tables.
    pub fn counts(&self) -> &CountTables {
        &self.tables
    }

    /// Distinct tokens seen during training.
    pub fn vocabulary(&self) -> &AHashSet<String> {
        self.tables.vocabulary()
    }

    /// Number of distinct tokens seen during training.
    pub fn vocabulary_size(&self) -> usize {
        self.tables.vocabulary().len()
    }

    /// Smoothed probability of the last token of `ngram` given the others.
    ///
    /// Unseen tokens and n-grams are valid queries and resolve to 0 or to
    /// the continuation fallback.
    ///
    /// # Errors
    /// Returns `InvalidNgram` if `ngram` is empty or longer than the order.
    pub fn probability<S: AsRef<str>>(&self, ngram: &[S]) -> Result<f64, KneserNeyError> {
        Ok(self.breakdown(ngram)?.probability())
    }

    /// Like [`KneserNey::probability`] but reports which branch produced
    /// the value and, when interpolated, its two terms.
    pub fn breakdown<S: AsRef<str>>(&self, ngram: &[S]) -> Result<Estimate, KneserNeyError> {
        if ngram.is_empty() || ngram.len() > self.order() {
            return Err(KneserNeyError::InvalidNgram {
                len: ngram.len(),
                order: self.order(),
            });
        }
        Ok(self.estimate(&to_owned_tokens(ngram)))
    }

    /// Tokenize an n-gram query such as `"El Gato"` the way the corpus was
    /// tokenized (without sentence markers) and break down its estimate.
    pub fn text_breakdown(&self, ngram: &str) -> Result<Estimate, KneserNeyError> {
        self.breakdown(&self.tokenizer.tokenize_fragment(ngram))
    }

    pub fn text_ngram_probability(&self, ngram: &str) -> Result<f64, KneserNeyError> {
        Ok(self.text_breakdown(ngram)?.probability())
    }

    /// `continuations(word) / total n-grams`, used when a context is unseen.
    pub fn continuation_probability(&self, word: &str) -> f64 {
        let suffix = [word.to_string()];
        self.tables.continuation_count(&suffix) as f64 / self.tables.total_ngrams() as f64
    }

    fn estimate(&self, ngram: &[String]) -> Estimate {
        if ngram.len() == 1 {
            let count = self.tables.unigram_count(&ngram[0]);
            return Estimate::Unigram {
                probability: count as f64 / self.tables.total_unigrams() as f64,
            };
        }

        let (prefix, word) = ngram.split_at(ngram.len() - 1);
        let word = &word[0];

        let prefix_count = self.tables.context_count(prefix);
        if prefix_count == 0 {
            log::trace!("Unseen context {:?}, using continuation of {:?}", prefix, word);
            return Estimate::Continuation {
                probability: self.continuation_probability(word),
            };
        }

        let prefix_count = prefix_count as f64;
        let ngram_count = self.tables.ngram_count(ngram) as f64;
        let lower_order = self.estimate(&ngram[1..]).probability();

        Estimate::Interpolated {
            discounted: (ngram_count - self.discount).max(0.0) / prefix_count,
            backoff: self.discount * lower_order / prefix_count,
            lower_order,
        }
    }

    /// Product of the probabilities of every `order`-length window.
    ///
    /// A sentence shorter than the order has no windows and scores `1.0`,
    /// which means "no evidence" rather than certainty.
    pub fn sentence_probability<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        self.window_estimates(to_owned_tokens(tokens))
            .fold(1.0, |prob, estimate| prob * estimate.probability())
    }

    /// Natural log of the sentence probability, accumulated per window so
    /// long sentences do not underflow. `0.0` for sentences with no
    /// windows and `-inf` as soon as one window has probability zero.
    pub fn sentence_log_probability<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        self.window_estimates(to_owned_tokens(tokens))
            .map(|estimate| estimate.probability().ln())
            .sum()
    }

    /// Tokenize a raw sentence with the model's tokenizer and score it.
    pub fn text_probability(&self, sentence: &str) -> f64 {
        let tokens = self.tokenizer.tokenize(sentence, self.order());
        self.sentence_probability(&tokens)
    }

    pub fn text_log_probability(&self, sentence: &str) -> f64 {
        let tokens = self.tokenizer.tokenize(sentence, self.order());
        self.sentence_log_probability(&tokens)
    }

    fn window_estimates(&self, tokens: Vec<String>) -> impl Iterator<Item = Estimate> + '_ {
        let order = self.order();
        (0..(tokens.len() + 1).saturating_sub(order))
            .map(move |i| self.estimate(&tokens[i..i + order]))
    }
}

fn to_owned_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens.iter().map(|t| t.as_ref().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 5] = [
        "el gato come pescado",
        "el perro come carne",
        "el gato duerme",
        "el perro ladra",
        "el perro come pescado",
    ];

    fn corpus() -> Vec<Vec<&'static str>> {
        CORPUS
            .iter()
            .map(|s| s.split_whitespace().collect())
            .collect()
    }

    fn model(order: usize, discount: f64) -> KneserNey {
        KneserNey::new(&corpus(), order, discount).unwrap()
    }

    #[test]
    fn test_reference_bigrams() {
        let m = model(2, 0.75);
        assert_eq!(m.probability(&["el", "gato"]).unwrap(), 2.0 / 3.0);
        assert_eq!(m.probability(&["gato", "come"]).unwrap(), 0.1875);
        assert_eq!(
            m.probability(&["come", "carne"]).unwrap(),
            0.14583333333333334
        );
        assert_eq!(
            m.probability(&["perro", "pescado"]).unwrap(),
            0.041666666666666664
        );
    }

    #[test]
    fn test_reference_sentence() {
        let m = model(2, 0.75);
        let tokens = ["el", "perro", "come", "carne"];
        assert_eq!(m.sentence_probability(&tokens), 0.11905924479166667);
        assert_eq!(m.text_probability("el perro come carne"), 0.11905924479166667);
    }

    #[test]
    fn test_reference_trigrams() {
        let m = model(3, 0.75);
        assert_eq!(m.probability(&["el", "perro", "come"]).unwrap(), 0.625);
        assert_eq!(m.probability(&["el", "gato", "come"]).unwrap(), 0.125);
        assert_eq!(m.probability(&["perro", "come", "pescado"]).unwrap(), 0.125);
        assert_eq!(m.probability(&["gato", "come", "carne"]).unwrap(), 0.0);
        assert_eq!(
            m.sentence_probability(&["el", "perro", "come", "carne"]),
            0.078125
        );
    }

    #[test]
    fn test_unigrams() {
        let m = model(2, 0.75);
        assert_eq!(m.probability(&["gato"]).unwrap(), 2.0 / 18.0);
        assert_eq!(m.probability(&["zorro"]).unwrap(), 0.0);
        assert!(matches!(
            m.breakdown(&["gato"]).unwrap(),
            Estimate::Unigram { .. }
        ));
    }

    #[test]
    fn test_unseen_context_uses_continuation() {
        let m = model(2, 0.75);
        // "zorro" never appears, "gato" follows one distinct word out of 13 bigrams
        let p = m.probability(&["zorro", "gato"]).unwrap();
        assert_eq!(p, 1.0 / 13.0);
        assert_eq!(p, m.continuation_probability("gato"));
        // "pescado" only ends sentences, so it is never a context
        assert_eq!(m.probability(&["pescado", "el"]).unwrap(), 0.0);
        assert!(matches!(
            m.breakdown(&["pescado", "el"]).unwrap(),
            Estimate::Continuation { .. }
        ));
    }

    #[test]
    fn test_unseen_word_after_seen_context() {
        let m = model(2, 0.75);
        assert_eq!(m.probability(&["el", "zorro"]).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_ngram_lengths() {
        let m = model(2, 0.75);
        let empty: [&str; 0] = [];
        assert!(matches!(
            m.probability(&empty),
            Err(KneserNeyError::InvalidNgram { len: 0, order: 2 })
        ));
        assert!(matches!(
            m.probability(&["el", "gato", "come"]),
            Err(KneserNeyError::InvalidNgram { len: 3, order: 2 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let m = model(3, 0.75);
        let first = m.probability(&["el", "perro", "come"]).unwrap();
        for _ in 0..10 {
            let again = m.probability(&["el", "perro", "come"]).unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
    }

    #[test]
    fn test_sentence_is_product_of_windows() {
        let m = model(2, 0.75);
        let tokens = ["el", "gato", "come", "carne"];
        let expected = 1.0
            * m.probability(&["el", "gato"]).unwrap()
            * m.probability(&["gato", "come"]).unwrap()
            * m.probability(&["come", "carne"]).unwrap();
        assert_eq!(m.sentence_probability(&tokens), expected);
    }

    #[test]
    fn test_short_sentence_has_no_evidence() {
        let m = model(3, 0.75);
        assert_eq!(m.sentence_probability(&["el", "gato"]), 1.0);
        assert_eq!(m.sentence_log_probability(&["el", "gato"]), 0.0);
        let empty: [&str; 0] = [];
        assert_eq!(m.sentence_probability(&empty), 1.0);
    }

    #[test]
    fn test_log_probability_tracks_linear() {
        let m = model(2, 0.75);
        let tokens = ["el", "perro", "come", "carne"];
        let linear = m.sentence_probability(&tokens);
        let log = m.sentence_log_probability(&tokens);
        assert!((log.exp() - linear).abs() < 1e-12);
        assert_eq!(
            m.sentence_log_probability(&["el", "zorro"]),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_smaller_discount_shifts_weight_to_frequency() {
        let high = model(2, 0.75).breakdown(&["el", "gato"]).unwrap();
        let low = model(2, 0.25).breakdown(&["el", "gato"]).unwrap();
        match (high, low) {
            (
                Estimate::Interpolated {
                    discounted: d_high,
                    backoff: b_high,
                    ..
                },
                Estimate::Interpolated {
                    discounted: d_low,
                    backoff: b_low,
                    ..
                },
            ) => {
                assert!(d_low > d_high);
                assert!(b_low < b_high);
                assert!(d_high >= 0.0 && d_low >= 0.0);
            }
            other => panic!("expected interpolated estimates, got {other:?}"),
        }
    }

    #[test]
    fn test_probabilities_non_negative() {
        let m = model(2, 0.75);
        let vocab: Vec<String> = m.vocabulary().iter().cloned().collect();
        for a in &vocab {
            for b in &vocab {
                let p = m.probability(&[a.as_str(), b.as_str()]).unwrap();
                assert!(p >= 0.0, "P({b}|{a}) = {p}");
            }
        }
    }

    #[test]
    fn test_context_normalizer_counts_distinct_continuations() {
        let m = model(2, 0.75);
        // 3 occurrences of "el perro" over 2 distinct continuations of "el"
        assert_eq!(m.probability(&["el", "perro"]).unwrap(), 1.1875);
        assert_eq!(m.probability(&["perro", "come"]).unwrap(), 0.6875);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            KneserNey::new(&corpus(), 0, 0.75),
            Err(KneserNeyError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            KneserNey::new(&corpus(), 2, 1.5),
            Err(KneserNeyError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let corpus: Vec<Vec<&str>> = vec![vec!["solo"], vec![]];
        assert!(matches!(
            KneserNey::new(&corpus, 2, 0.75),
            Err(KneserNeyError::EmptyCorpus { order: 2 })
        ));
    }

    #[test]
    fn test_from_text_with_tokenizer() {
        let lines = ["El Gato come", "el perro come"];
        let m = KneserNey::from_text(lines, 2, 0.75, Tokenizer::new(true, true)).unwrap();
        assert_eq!(m.counts().unigram_count("gato"), 1);
        assert_eq!(m.counts().unigram_count("<s>"), 2);
        // "el" now has a sentence-start context
        assert!(
            m.probability(&["<s>", "el"]).unwrap() > m.probability(&["<s>", "come"]).unwrap()
        );
        assert_eq!(
            m.text_probability("EL GATO COME"),
            m.sentence_probability(&["<s>", "el", "gato", "come", "</s>"])
        );
    }

    #[test]
    fn test_text_ngram_uses_model_tokenizer() {
        let lines = CORPUS;
        let m = KneserNey::from_text(lines, 2, 0.75, Tokenizer::new(true, false)).unwrap();
        let p = m.text_ngram_probability("El Gato").unwrap();
        assert_eq!(p, m.probability(&["el", "gato"]).unwrap());
        assert_eq!(p, m.text_probability("El Gato"));
        assert_eq!(p, 2.0 / 3.0);
    }

    #[test]
    fn test_text_ngram_skips_sentence_markers() {
        let m = KneserNey::from_text(CORPUS, 2, 0.75, Tokenizer::new(false, true)).unwrap();
        // With markers "el gato" would become a 4-token sentence
        assert_eq!(
            m.text_breakdown("el gato").unwrap(),
            m.breakdown(&["el", "gato"]).unwrap()
        );
        assert!(matches!(
            m.text_ngram_probability("el gato come"),
            Err(KneserNeyError::InvalidNgram { len: 3, order: 2 })
        ));
    }

    #[test]
    fn test_order_one_model() {
        let corpus = vec![vec!["a", "b", "a"], vec!["c"]];
        let m = KneserNey::new(&corpus, 1, 0.75).unwrap();

        assert_eq!(m.probability(&["a"]).unwrap(), 2.0 / 4.0);
        assert_eq!(m.probability(&["b"]).unwrap(), 1.0 / 4.0);
        assert_eq!(m.probability(&["z"]).unwrap(), 0.0);
        assert!(matches!(
            m.breakdown(&["c"]).unwrap(),
            Estimate::Unigram { .. }
        ));

        // Every window is a single token scored by its relative frequency
        let expected = 1.0 * (2.0 / 4.0) * (1.0 / 4.0) * (1.0 / 4.0);
        assert_eq!(m.sentence_probability(&["a", "b", "c"]), expected);
        let empty: [&str; 0] = [];
        assert_eq!(m.sentence_probability(&empty), 1.0);
    }
}
