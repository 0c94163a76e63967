use crate::error::{validate_discount, validate_order, KneserNeyError};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "kneser-ney";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub order: usize,
    pub discount: f64,
    pub lowercase: bool,
    pub sentence_markers: bool,
    pub corpus_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: 2,
            discount: 0.75,
            lowercase: false,
            sentence_markers: false,
            corpus_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load(APP_NAME, Some(CONFIG_NAME)) {
            Ok(config) => Ok(config),
            Err(err) => {
                log::warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, Some(CONFIG_NAME), self)
    }

    pub fn validate(&self) -> Result<(), KneserNeyError> {
        validate_order(self.order)?;
        validate_discount(self.discount)
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.lowercase, self.sentence_markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tokenizer(), Tokenizer::default());
    }

    #[test]
    fn test_validate_rejects_bad_discount() {
        let config = Config {
            discount: 1.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(KneserNeyError::InvalidConfiguration { .. })
        ));
    }
}
