//! Errors raised while building or querying a Kneser-Ney model.
//!
//! Unseen tokens and n-grams are never errors: they resolve to a zero
//! probability or to the continuation fallback. Only malformed settings,
//! an empty training set, malformed queries and corpus I/O fail.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KneserNeyError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("corpus yields no n-grams of order {order}")]
    EmptyCorpus { order: usize },

    #[error("invalid n-gram: length {len} is outside 1..={order}")]
    InvalidNgram { len: usize, order: usize },

    #[error("corpus i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl KneserNeyError {
    pub(crate) fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

pub(crate) fn validate_order(order: usize) -> Result<(), KneserNeyError> {
    if order < 1 {
        return Err(KneserNeyError::invalid_configuration(format!(
            "order must be >= 1, got {order}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_discount(discount: f64) -> Result<(), KneserNeyError> {
    // NaN fails both comparisons
    if !(discount > 0.0 && discount < 1.0) {
        return Err(KneserNeyError::invalid_configuration(format!(
            "discount must be in (0, 1), got {discount}"
        )));
    }
    Ok(())
}
