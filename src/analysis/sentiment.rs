//! Lexicon-based polarity scoring.
//!
//! Polarity is a score in `[-1.0, 1.0]` whose sign decides the sentiment
//! class of a review. The default scorer averages the weights of known
//! opinion words and flips the weight of a word that follows a negator.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Something that can score the polarity of a text.
pub trait PolarityScorer: Send + Sync {
    /// Score a text. Implementations must return a value in `[-1.0, 1.0]`.
    fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

// Opinion words and their weights
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    vec![
        // positive
        ("good", 0.7),
        ("great", 0.8),
        ("excellent", 1.0),
        ("amazing", 0.6),
        ("wonderful", 1.0),
        ("fantastic", 0.4),
        ("superb", 1.0),
        ("outstanding", 0.5),
        ("brilliant", 0.9),
        ("love", 0.5),
        ("loved", 0.7),
        ("best", 1.0),
        ("better", 0.5),
        ("happy", 0.8),
        ("beautiful", 0.85),
        ("perfect", 1.0),
        ("awesome", 1.0),
        ("incredible", 0.9),
        ("pleasant", 0.7),
        ("satisfied", 0.5),
        ("recommend", 0.4),
        ("recommended", 0.4),
        ("impressive", 1.0),
        ("reliable", 0.6),
        ("efficient", 0.5),
        ("effective", 0.6),
        ("helpful", 0.5),
        ("quality", 0.3),
        ("sturdy", 0.5),
        ("comfortable", 0.4),
        ("easy", 0.43),
        ("fast", 0.2),
        ("quiet", 0.3),
        ("nice", 0.6),
        ("well", 0.5),
        ("works", 0.2),
        ("worth", 0.3),
        ("warm", 0.6),
        ("solid", 0.3),
        // negative
        ("bad", -0.7),
        ("terrible", -1.0),
        ("awful", -1.0),
        ("horrible", -1.0),
        ("poor", -0.4),
        ("worst", -1.0),
        ("worse", -0.4),
        ("hate", -0.8),
        ("disappointing", -0.6),
        ("disappointed", -0.75),
        ("failed", -0.5),
        ("fail", -0.5),
        ("useless", -0.5),
        ("waste", -0.2),
        ("broken", -0.4),
        ("broke", -0.4),
        ("defective", -0.6),
        ("cheap", -0.2),
        ("flimsy", -0.5),
        ("noisy", -0.3),
        ("loud", -0.2),
        ("slow", -0.3),
        ("difficult", -0.5),
        ("confusing", -0.4),
        ("expensive", -0.5),
        ("overpriced", -0.6),
        ("unreliable", -0.6),
        ("stopped", -0.3),
        ("returned", -0.2),
        ("cold", -0.6),
        ("annoying", -0.8),
        ("mediocre", -0.4),
    ]
    .into_iter()
    .collect()
});

static NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "didn't", "can't", "won't",
];

/// Default scorer backed by a fixed word list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lowercase_text = text.to_lowercase();
        let words: Vec<&str> = lowercase_text
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .filter(|w| !w.is_empty())
            .collect();

        let mut total = 0.0;
        let mut matched = 0usize;
        let mut negate = false;

        for word in words {
            if NEGATORS.contains(&word) {
                negate = true;
                continue;
            }

            if let Some(weight) = LEXICON.get(word) {
                total += if negate { -0.5 * weight } else { *weight };
                matched += 1;
            }
            negate = false;
        }

        if matched == 0 {
            return 0.0;
        }

        (total / matched as f64).clamp(-1.0, 1.0)
    }
}
