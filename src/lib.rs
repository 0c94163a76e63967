//! Interpolated Kneser-Ney smoothing for word n-grams.
//!
//! # Overview
//!
//! A model is trained once from a corpus of sentences and is immutable
//! afterwards:
//!
//! ```text
//! ┌─────────────────┐
//! │  Corpus lines   │ ← corpus.rs (file or built-in)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Tokenizer     │ ← whitespace split, optional markers (tokenizer.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Count Tables   │ ← unigram, n-gram, continuation, context (counts.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   KneserNey     │ ← recursive estimate, sentence scoring (model.rs)
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `counts`: count tables and their builder
//! - `model`: the probability engine and sentence scorer
//! - `shared`: `Arc` snapshots with copy-on-write retraining
//! - `tokenizer`: sentence splitting
//! - `corpus`: corpus file loading
//! - `config`: persisted settings
//! - `error`: the crate error type

pub mod config;
pub mod corpus;
pub mod counts;
pub mod error;
pub mod model;
pub mod shared;
pub mod tokenizer;

pub use config::Config;
pub use counts::{CountTables, CountTablesBuilder, Ngram};
pub use error::KneserNeyError;
pub use model::{Estimate, KneserNey};
pub use shared::SharedModel;
pub use tokenizer::Tokenizer;
