//! Command-line front end: trains a model and prints sample probabilities.
//!
//! Settings come from the persisted config (`confy`), overridden per run by
//! flags. `RUST_LOG` controls logging (default `info`).

use clap::Parser;
use kneser_ney::corpus::resolve_corpus;
use kneser_ney::{Config, Estimate, KneserNey};

/// Bigrams shown when no query is given.
const DEMO_NGRAMS: [&str; 4] = ["el gato", "gato come", "come carne", "perro pescado"];
const DEMO_SENTENCE: &str = "el perro come carne";

#[derive(Parser, Debug)]
#[command(name = "kneser-ney")]
#[command(about = "Interpolated Kneser-Ney n-gram probabilities")]
#[command(version)]
struct Args {
    /// Corpus file, one sentence per line
    #[arg(short, long)]
    corpus: Option<std::path::PathBuf>,

    /// N-gram order
    #[arg(short, long)]
    order: Option<usize>,

    /// Discount in (0, 1)
    #[arg(short, long)]
    discount: Option<f64>,

    /// Lowercase tokens
    #[arg(long, conflicts_with = "no_lowercase")]
    lowercase: bool,

    /// Keep token case, overriding a saved config
    #[arg(long)]
    no_lowercase: bool,

    /// Wrap sentences in <s> and </s> markers
    #[arg(long, conflicts_with = "no_sentence_markers")]
    sentence_markers: bool,

    /// Disable sentence markers, overriding a saved config
    #[arg(long)]
    no_sentence_markers: bool,

    /// N-gram to score, tokens separated by spaces (repeatable)
    #[arg(short, long)]
    ngram: Vec<String>,

    /// Sentence to score (repeatable)
    #[arg(short, long)]
    sentence: Vec<String>,

    /// Show the discounted and backoff terms for each n-gram
    #[arg(long)]
    explain: bool,

    /// Persist the effective settings as the new defaults
    #[arg(long)]
    save_config: bool,
}

/// An on/off flag pair; `None` keeps the configured value.
fn flag_override(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Flags given on the command line win over the persisted config.
fn apply_args(config: &mut Config, args: &Args) {
    if let Some(order) = args.order {
        config.order = order;
    }
    if let Some(discount) = args.discount {
        config.discount = discount;
    }
    if args.corpus.is_some() {
        config.corpus_path = args.corpus.clone();
    }
    if let Some(lowercase) = flag_override(args.lowercase, args.no_lowercase) {
        config.lowercase = lowercase;
    }
    if let Some(markers) = flag_override(args.sentence_markers, args.no_sentence_markers) {
        config.sentence_markers = markers;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = Config::load()?;
    apply_args(&mut config, &args);
    config.validate()?;

    if args.save_config {
        if let Err(err) = config.save() {
            log::warn!("Failed to save config: {err}");
        }
    }

    let sentences = resolve_corpus(config.corpus_path.as_deref())?;
    let model = KneserNey::from_text(
        &sentences,
        config.order,
        config.discount,
        config.tokenizer(),
    )?;

    let (ngrams, queries): (Vec<String>, Vec<String>) =
        if args.ngram.is_empty() && args.sentence.is_empty() {
            (
                DEMO_NGRAMS.iter().map(|s| s.to_string()).collect(),
                vec![DEMO_SENTENCE.to_string()],
            )
        } else {
            (args.ngram.clone(), args.sentence.clone())
        };

    for ngram in &ngrams {
        let tokens = model.tokenizer().tokenize_fragment(ngram);
        let estimate = match model.text_breakdown(ngram) {
            Ok(estimate) => estimate,
            Err(e) => {
                eprintln!("Skipping '{}': {}", ngram, e);
                continue;
            }
        };

        let (context, word) = tokens.split_at(tokens.len() - 1);
        println!(
            "P('{}' | '{}'): {}",
            word[0],
            context.join(" "),
            estimate.probability()
        );

        if args.explain {
            match estimate {
                Estimate::Unigram { .. } => println!("    unigram relative frequency"),
                Estimate::Continuation { .. } => {
                    println!("    unseen context, continuation probability")
                }
                Estimate::Interpolated {
                    discounted,
                    backoff,
                    lower_order,
                } => println!(
                    "    discounted {} + backoff {} (lower order {})",
                    discounted, backoff, lower_order
                ),
            }
        }
    }

    for sentence in &queries {
        println!(
            "P('{}'): {} (log {})",
            sentence,
            model.text_probability(sentence),
            model.text_log_probability(sentence)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_config() -> Config {
        Config {
            lowercase: true,
            sentence_markers: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_no_flags_keep_saved_config() {
        let mut config = saved_config();
        apply_args(&mut config, &Args::parse_from(["kneser-ney"]));
        assert_eq!(config, saved_config());
    }

    #[test]
    fn test_negative_flags_turn_settings_off() {
        let mut config = saved_config();
        let args = Args::parse_from(["kneser-ney", "--no-lowercase", "--no-sentence-markers"]);
        apply_args(&mut config, &args);
        assert!(!config.lowercase);
        assert!(!config.sentence_markers);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let args = Args::parse_from(["kneser-ney", "--lowercase", "-o", "3", "-d", "0.5"]);
        apply_args(&mut config, &args);
        assert!(config.lowercase);
        assert!(!config.sentence_markers);
        assert_eq!(config.order, 3);
        assert_eq!(config.discount, 0.5);
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Args::try_parse_from(["kneser-ney", "--lowercase", "--no-lowercase"]).is_err());
    }

    #[test]
    fn test_ngram_query_follows_lowercase_config() {
        let mut config = Config::default();
        apply_args(&mut config, &Args::parse_from(["kneser-ney", "--lowercase"]));
        let model = KneserNey::from_text(
            kneser_ney::corpus::builtin_corpus(),
            config.order,
            config.discount,
            config.tokenizer(),
        )
        .unwrap();
        assert_eq!(model.text_ngram_probability("El Gato").unwrap(), 2.0 / 3.0);
    }
}
