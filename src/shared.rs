//! Thread-safe handle around a trained model with copy-on-write retraining.
//!
//! Readers clone an `Arc` snapshot under a short read lock and run the whole
//! recursion against that snapshot. Retraining builds a new model without
//! holding the lock and then swaps the `Arc`, so a query never sees tables
//! change halfway through.

use crate::error::KneserNeyError;
use crate::model::KneserNey;
use crate::tokenizer::Tokenizer;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle serving one model at a time.
///
/// # Example
/// ```rust
/// use kneser_ney::{KneserNey, SharedModel, Tokenizer};
///
/// let model = KneserNey::from_text(["el gato come"], 2, 0.75, Tokenizer::default())?;
/// let handle = SharedModel::new(model);
/// handle.retrain(["el perro come", "el perro ladra"])?;
/// assert_eq!(handle.snapshot().counts().unigram_count("gato"), 0);
/// # Ok::<(), kneser_ney::KneserNeyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedModel {
    inner: Arc<RwLock<Arc<KneserNey>>>,
}

impl SharedModel {
    /// Start serving `model`.
    pub fn new(model: KneserNey) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(model))),
        }
    }

    /// The model currently being served.
    pub fn snapshot(&self) -> Arc<KneserNey> {
        Arc::clone(&self.inner.read())
    }

    /// Probability from the current snapshot.
    pub fn probability<S: AsRef<str>>(&self, ngram: &[S]) -> Result<f64, KneserNeyError> {
        self.snapshot().probability(ngram)
    }

    /// Sentence probability from the current snapshot.
    pub fn sentence_probability<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        self.snapshot().sentence_probability(tokens)
    }

    /// Replace the served model with one trained on `lines`, keeping the
    /// current order, discount and tokenizer.
    ///
    /// On error the current model stays in place.
    pub fn retrain<I, S>(&self, lines: I) -> Result<(), KneserNeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current = self.snapshot();
        let tokenizer: Tokenizer = *current.tokenizer();
        let model = KneserNey::from_text(lines, current.order(), current.discount(), tokenizer)?;
        self.replace(model);
        Ok(())
    }

    /// Swap in an already trained model. Existing snapshots keep the old one.
    pub fn replace(&self, model: KneserNey) {
        *self.inner.write() = Arc::new(model);
        log::info!("Swapped in retrained model");
    }
}
