//! Data models for the review analyzer.
//!
//! This module contains the input records loaded from the data files and
//! the derived structures produced by analysis and reporting.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lowest rating a review may carry.
pub const MIN_RATING: u8 = 1;
/// Highest rating a review may carry.
pub const MAX_RATING: u8 = 5;

/// A product from `products.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    /// Unique product key.
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_number")]
    pub price: f64,
}

/// A review from `reviews.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Review {
    /// Foreign key into the product list.
    pub product_id: String,
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Sentiment class derived from a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Classify a polarity score by its sign.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Sentiment::Positive
        } else if polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Hex colour used when charting this class.
    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Positive => "#2ecc71",
            Sentiment::Neutral => "#95a5a6",
            Sentiment::Negative => "#e74c3c",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Negative => write!(f, "Negative"),
        }
    }
}

/// Review counts per sentiment class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    /// Count one classified review.
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    /// Sum over all classes.
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Chart-ordered (class, count) pairs.
    pub fn slices(&self) -> [(Sentiment, usize); 3] {
        [
            (Sentiment::Positive, self.positive),
            (Sentiment::Neutral, self.neutral),
            (Sentiment::Negative, self.negative),
        ]
    }
}

/// Example comments joined for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSamples {
    pub positive_summary: String,
    pub negative_summary: String,
}

/// Sentiment section of a product summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(flatten)]
    pub counts: SentimentCounts,
    #[serde(flatten)]
    pub samples: SentimentSamples,
}

/// Aggregated view of one product and its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub description: String,
    pub price: f64,
    /// Mean rating rounded to two decimals, 0 when there are no reviews.
    pub average_rating: f64,
    pub total_reviews: usize,
    pub sentiment_analysis: SentimentAnalysis,
    /// Most frequent words, highest count first.
    pub common_keywords: Vec<(String, usize)>,
}

/// Number of reviews per rating bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingHistogram {
    /// `counts[0]` holds rating 1, `counts[4]` rating 5.
    pub counts: [usize; 5],
}

impl RatingHistogram {
    /// Build a histogram from review ratings. Out-of-range values are ignored.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut histogram = Self::default();
        for rating in ratings {
            if (MIN_RATING..=MAX_RATING).contains(&rating) {
                histogram.counts[(rating - MIN_RATING) as usize] += 1;
            }
        }
        histogram
    }

    /// (rating, count) pairs for ratings 1 through 5.
    pub fn buckets(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, count)| (i as u8 + MIN_RATING, *count))
    }

    /// Largest bucket count.
    pub fn peak(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// What the remote agent produced for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutputs {
    /// Final run status reported by the service.
    pub run_status: String,
    /// Latest assistant text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Local paths of files downloaded from the agent.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Everything produced for one product request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub product_id: String,
    pub product_summary: ProductSummary,
    pub rating_histogram: RatingHistogram,
    /// Path to the rating bar chart, `None` if rendering failed.
    pub bar_chart: Option<String>,
    /// Path to the sentiment pie chart, `None` if rendering failed.
    pub pie_chart: Option<String>,
    /// Agent response, `None` when the agent step was skipped.
    pub outputs: Option<AgentOutputs>,
}

/// Metadata about a saved analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub product_id: String,
    pub analysis_date: DateTime<Utc>,
    /// Model the agent was created with, `None` when the agent was skipped.
    pub model_used: Option<String>,
    pub products_file: String,
    pub reviews_file: String,
    pub duration_seconds: f64,
}

/// A saved analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub result: AnalysisResult,
}

/// Accepts a JSON number or a numeric string.
fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {:?}", s))),
    }
}

/// Accepts an integer rating given as a number or string.
fn deserialize_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_number(deserializer)?;
    if value.fract() != 0.0 {
        return Err(de::Error::custom(format!(
            "rating must be an integer, got {}",
            value
        )));
    }
    if value < f64::from(u8::MIN) || value > f64::from(u8::MAX) {
        return Err(de::Error::custom(format!("rating {} is out of range", value)));
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_polarity() {
        assert_eq!(Sentiment::from_polarity(0.4), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.1), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_product_from_pascal_case_json() {
        let json =
            r#"{"ProductId":"HT-1000","Name":"Heater","Description":"Warm","Price":"49.99"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_id, "HT-1000");
        assert_eq!(product.price, 49.99);
    }

    #[test]
    fn test_review_rating_coercion() {
        let review: Review =
            serde_json::from_str(r#"{"ProductId":"A","Rating":"4","Comment":"ok"}"#).unwrap();
        assert_eq!(review.rating, 4);

        let review: Review =
            serde_json::from_str(r#"{"ProductId":"A","Rating":5,"Comment":"ok"}"#).unwrap();
        assert_eq!(review.rating, 5);

        assert!(serde_json::from_str::<Review>(r#"{"ProductId":"A","Rating":3.5}"#).is_err());
        assert!(serde_json::from_str::<Review>(r#"{"ProductId":"A","Rating":"five"}"#).is_err());
    }

    #[test]
    fn test_rating_histogram() {
        let histogram = RatingHistogram::from_ratings(vec![5, 5, 1, 3, 9]);
        assert_eq!(histogram.counts, [1, 0, 1, 0, 2]);
        assert_eq!(histogram.counts.iter().sum::<usize>(), 4);
        assert_eq!(histogram.peak(), 2);

        let buckets: Vec<_> = histogram.buckets().collect();
        assert_eq!(buckets[0], (1, 1));
        assert_eq!(buckets[4], (5, 2));
    }

    #[test]
    fn test_sentiment_analysis_serializes_flat() {
        let analysis = SentimentAnalysis {
            counts: SentimentCounts {
                positive: 2,
                neutral: 1,
                negative: 0,
            },
            samples: SentimentSamples {
                positive_summary: "a | b".to_string(),
                negative_summary: String::new(),
            },
        };

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["positive"], 2);
        assert_eq!(value["neutral"], 1);
        assert_eq!(value["positive_summary"], "a | b");
    }
}
