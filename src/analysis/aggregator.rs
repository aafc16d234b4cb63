//! Review aggregation and statistics.
//!
//! This module joins a product with its reviews and computes the
//! summary record: rating statistics, sentiment counts with sample
//! comments, and keyword frequency.

use crate::analysis::sentiment::PolarityScorer;
use crate::catalog::Snapshot;
use crate::error::{AppError, AppResult};
use crate::models::{
    ProductSummary, RatingHistogram, Review, Sentiment, SentimentAnalysis, SentimentCounts,
    SentimentSamples,
};
use std::collections::HashMap;

/// Maximum number of sample comments kept per sentiment class.
pub const MAX_SAMPLES: usize = 3;

/// Number of keywords reported.
pub const TOP_KEYWORDS: usize = 5;

/// Separator between sample comments in the display string.
pub const SAMPLE_SEPARATOR: &str = " | ";

/// Computes product summaries from a snapshot.
pub struct ReviewAggregator<'a> {
    snapshot: &'a Snapshot,
    scorer: &'a dyn PolarityScorer,
}

impl<'a> ReviewAggregator<'a> {
    pub fn new(snapshot: &'a Snapshot, scorer: &'a dyn PolarityScorer) -> Self {
        Self { snapshot, scorer }
    }

    /// Build the summary for one product.
    pub fn analyze(&self, product_id: &str) -> AppResult<ProductSummary> {
        let product_id = checked_id(product_id)?;

        let product = self
            .snapshot
            .product(product_id)
            .ok_or_else(|| AppError::NotFound(product_id.to_string()))?;

        let reviews: Vec<&Review> = self.snapshot.reviews_for(product_id).collect();
        let comments: Vec<&str> = reviews.iter().map(|r| r.comment.as_str()).collect();

        Ok(ProductSummary {
            product_name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            average_rating: average_rating(&reviews),
            total_reviews: reviews.len(),
            sentiment_analysis: analyze_sentiment(&comments, self.scorer),
            common_keywords: top_keywords(&comments, TOP_KEYWORDS),
        })
    }

    /// Rating distribution for one product.
    pub fn rating_histogram(&self, product_id: &str) -> AppResult<RatingHistogram> {
        let product_id = checked_id(product_id)?;

        if self.snapshot.product(product_id).is_none() {
            return Err(AppError::NotFound(product_id.to_string()));
        }

        Ok(RatingHistogram::from_ratings(
            self.snapshot.reviews_for(product_id).map(|r| r.rating),
        ))
    }
}

fn checked_id(product_id: &str) -> AppResult<&str> {
    let trimmed = product_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "product id must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Mean rating rounded to two decimals, 0 for no reviews.
pub fn average_rating(reviews: &[&Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }

    let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
    round2(sum as f64 / reviews.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify every comment once and derive counts and samples.
pub fn analyze_sentiment(comments: &[&str], scorer: &dyn PolarityScorer) -> SentimentAnalysis {
    let classified: Vec<(&str, Sentiment)> = comments
        .iter()
        .map(|c| (*c, Sentiment::from_polarity(scorer.polarity(c))))
        .collect();

    let mut counts = SentimentCounts::default();
    for (_, sentiment) in &classified {
        counts.record(*sentiment);
    }

    let samples = SentimentSamples {
        positive_summary: join_samples(&classified, Sentiment::Positive),
        negative_summary: join_samples(&classified, Sentiment::Negative),
    };

    SentimentAnalysis { counts, samples }
}

fn join_samples(classified: &[(&str, Sentiment)], wanted: Sentiment) -> String {
    classified
        .iter()
        .filter(|(_, s)| *s == wanted)
        .map(|(c, _)| *c)
        .take(MAX_SAMPLES)
        .collect::<Vec<_>>()
        .join(SAMPLE_SEPARATOR)
}

/// Most frequent lower-cased words across all comments.
///
/// Words are split on whitespace only. Ties keep the order in which the
/// words first appeared.
pub fn top_keywords(comments: &[&str], n: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for comment in comments {
        for word in comment.to_lowercase().split_whitespace() {
            match index.get(word) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(word.to_string(), counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sentiment::LexiconScorer;
    use crate::models::Product;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            product_id: id.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            price,
        }
    }

    fn review(id: &str, rating: u8, comment: &str) -> Review {
        Review {
            product_id: id.to_string(),
            rating,
            comment: comment.to_string(),
        }
    }

    fn heater_snapshot() -> Snapshot {
        Snapshot::new(
            vec![product("HT-1000", "Heater", 49.99), product("HT-1001", "Fan", 19.0)],
            vec![
                review("HT-1000", 5, "great heater works well"),
                review("HT-1001", 4, "nice fan"),
                review("HT-1000", 1, "broke after a week bad"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_heater_scenario() {
        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);

        let summary = aggregator.analyze("HT-1000").unwrap();
        assert_eq!(summary.product_name, "Heater");
        assert_eq!(summary.price, 49.99);
        assert_eq!(summary.average_rating, 3.0);
        assert_eq!(summary.total_reviews, 2);

        let counts = summary.sentiment_analysis.counts;
        assert_eq!(counts.positive, 1);
        assert_eq!(counts.negative, 1);
        assert_eq!(counts.neutral, 0);

        assert_eq!(
            summary.sentiment_analysis.samples.positive_summary,
            "great heater works well"
        );
        assert_eq!(
            summary.sentiment_analysis.samples.negative_summary,
            "broke after a week bad"
        );
        assert!(summary
            .common_keywords
            .contains(&("heater".to_string(), 1)));
        assert_eq!(summary.common_keywords.len(), 5);
    }

    #[test]
    fn test_unknown_product() {
        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);

        let err = aggregator.analyze("unknown-id").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref id) if id == "unknown-id"));
        assert!(matches!(
            aggregator.rating_histogram("unknown-id"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);
        assert!(matches!(
            aggregator.analyze("  "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ids_are_matched_after_trimming() {
        assert!(matches!(
            Snapshot::new(vec![product("HT-1000 ", "Heater", 1.0)], vec![]),
            Err(AppError::MalformedData { .. })
        ));

        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);
        let summary = aggregator.analyze(" HT-1000 ").unwrap();
        assert_eq!(summary.product_name, "Heater");
    }

    #[test]
    fn test_product_without_reviews() {
        let snapshot = Snapshot::new(vec![product("X", "Lonely", 1.0)], vec![]).unwrap();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);

        let summary = aggregator.analyze("X").unwrap();
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_reviews, 0);
        assert_eq!(summary.sentiment_analysis.counts.total(), 0);
        assert!(summary.common_keywords.is_empty());
        assert_eq!(summary.sentiment_analysis.samples.positive_summary, "");
    }

    #[test]
    fn test_average_rating_rounds_to_two_decimals() {
        let reviews = vec![review("A", 5, ""), review("A", 4, ""), review("A", 4, "")];
        let refs: Vec<&Review> = reviews.iter().collect();
        assert_eq!(average_rating(&refs), 4.33);
    }

    #[test]
    fn test_counts_sum_to_total() {
        // Alternating signs with zeros in between
        let scorer = |text: &str| match text.len() % 3 {
            0 => 0.0,
            1 => 0.5,
            _ => -0.5,
        };
        let comments = vec!["", "a", "ab", "abc", "abcd", "abcde", "abcdef"];
        let analysis = analyze_sentiment(&comments, &scorer);

        assert_eq!(analysis.counts.total(), comments.len());
        assert_eq!(analysis.counts.neutral, 3);
        assert_eq!(analysis.counts.positive, 2);
        assert_eq!(analysis.counts.negative, 2);
    }

    #[test]
    fn test_polarity_scored_once_per_comment() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = AtomicUsize::new(0);
        let scorer = |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            0.0
        };
        let comments = vec!["one", "two", "three"];
        let analysis = analyze_sentiment(&comments, &scorer);

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(analysis.counts.neutral, 3);
    }

    #[test]
    fn test_samples_capped_and_ordered() {
        let scorer = |text: &str| if text.starts_with('p') { 1.0 } else { -1.0 };
        let comments = vec!["p1", "n1", "p2", "p3", "p4", "n2"];
        let analysis = analyze_sentiment(&comments, &scorer);

        assert_eq!(analysis.samples.positive_summary, "p1 | p2 | p3");
        assert_eq!(analysis.samples.negative_summary, "n1 | n2");
        assert_eq!(analysis.counts.positive, 4);
    }

    #[test]
    fn test_top_keywords_ordering() {
        let comments = vec!["b a c", "A b d", "e f b"];
        let keywords = top_keywords(&comments, 5);

        assert_eq!(keywords[0], ("b".to_string(), 3));
        assert_eq!(keywords[1], ("a".to_string(), 2));
        // Ties resolved by first appearance
        assert_eq!(keywords[2], ("c".to_string(), 1));
        assert_eq!(keywords[3], ("d".to_string(), 1));
        assert_eq!(keywords[4], ("e".to_string(), 1));
    }

    #[test]
    fn test_top_keywords_keeps_punctuation() {
        let keywords = top_keywords(&["good, good"], 5);
        assert_eq!(
            keywords,
            vec![("good,".to_string(), 1), ("good".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_keywords_fewer_than_limit() {
        let keywords = top_keywords(&["one two", "two"], 5);
        assert_eq!(keywords.len(), 2);
        assert!(keywords.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);

        let first = serde_json::to_string(&aggregator.analyze("HT-1000").unwrap()).unwrap();
        let second = serde_json::to_string(&aggregator.analyze("HT-1000").unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rating_histogram() {
        let snapshot = heater_snapshot();
        let aggregator = ReviewAggregator::new(&snapshot, &LexiconScorer);

        let histogram = aggregator.rating_histogram("HT-1000").unwrap();
        assert_eq!(histogram.counts, [1, 0, 0, 0, 1]);
    }
}
