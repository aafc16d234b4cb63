//! Report generation.
//!
//! This module renders a saved analysis as Markdown or JSON.

use crate::models::{AgentOutputs, ProductSummary, RatingHistogram, Report, ReportMetadata};
use anyhow::Result;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();
    let result = &report.result;

    output.push_str(&format!(
        "# Product Analysis: {}\n\n",
        result.product_summary.product_name
    ));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_product_section(&result.product_summary));
    output.push_str(&generate_ratings_section(
        &result.product_summary,
        &result.rating_histogram,
    ));
    output.push_str(&generate_sentiment_section(&result.product_summary));
    output.push_str(&generate_keywords_section(&result.product_summary));
    output.push_str(&generate_charts_section(
        result.bar_chart.as_deref(),
        result.pie_chart.as_deref(),
    ));
    output.push_str(&generate_agent_section(result.outputs.as_ref()));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Product ID:** `{}`\n", metadata.product_id));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref model) = metadata.model_used {
        section.push_str(&format!("- **Model Used:** `{}`\n", model));
    }
    section.push_str(&format!(
        "- **Data Files:** `{}`, `{}`\n",
        metadata.products_file, metadata.reviews_file
    ));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_product_section(summary: &ProductSummary) -> String {
    let mut section = String::new();

    section.push_str("## Product\n\n");
    section.push_str(&format!("- **Name:** {}\n", summary.product_name));
    if !summary.description.is_empty() {
        section.push_str(&format!("- **Description:** {}\n", summary.description));
    }
    section.push_str(&format!("- **Price:** {:.2}\n\n", summary.price));

    section
}

/// Generate the ratings section with the distribution table.
fn generate_ratings_section(summary: &ProductSummary, histogram: &RatingHistogram) -> String {
    let mut section = String::new();

    section.push_str("## Ratings\n\n");
    section.push_str(&format!(
        "**Average Rating:** {:.2} from {} reviews\n\n",
        summary.average_rating, summary.total_reviews
    ));

    if summary.total_reviews == 0 {
        section.push_str("No reviews yet.\n\n");
        return section;
    }

    section.push_str("| Rating | Count |\n");
    section.push_str("|:---:|:---:|\n");
    for (rating, count) in histogram.buckets() {
        section.push_str(&format!("| {} | {} |\n", "★".repeat(rating as usize), count));
    }
    section.push('\n');

    section
}

fn generate_sentiment_section(summary: &ProductSummary) -> String {
    let mut section = String::new();
    let sentiment = &summary.sentiment_analysis;

    section.push_str("## Sentiment\n\n");
    section.push_str("| Positive | Neutral | Negative |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        sentiment.counts.positive, sentiment.counts.neutral, sentiment.counts.negative
    ));

    if !sentiment.samples.positive_summary.is_empty() {
        section.push_str(&format!(
            "> 👍 **Positive:** {}\n\n",
            sentiment.samples.positive_summary
        ));
    }
    if !sentiment.samples.negative_summary.is_empty() {
        section.push_str(&format!(
            "> 👎 **Negative:** {}\n\n",
            sentiment.samples.negative_summary
        ));
    }

    section
}

fn generate_keywords_section(summary: &ProductSummary) -> String {
    if summary.common_keywords.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Most Common Keywords\n\n");
    section.push_str("| Keyword | Count |\n");
    section.push_str("|:---|:---:|\n");
    for (word, count) in &summary.common_keywords {
        section.push_str(&format!("| `{}` | {} |\n", word, count));
    }
    section.push('\n');

    section
}

fn generate_charts_section(bar_chart: Option<&str>, pie_chart: Option<&str>) -> String {
    if bar_chart.is_none() && pie_chart.is_none() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Charts\n\n");
    if let Some(path) = bar_chart {
        section.push_str(&format!("![Ratings distribution]({})\n\n", path));
    }
    if let Some(path) = pie_chart {
        section.push_str(&format!("![Sentiment analysis]({})\n\n", path));
    }

    section
}

/// Generate the agent narrative section.
fn generate_agent_section(outputs: Option<&AgentOutputs>) -> String {
    let Some(outputs) = outputs else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## Agent Narrative\n\n");
    section.push_str(&format!("*Run status: {}*\n\n", outputs.run_status));

    match outputs.message {
        Some(ref message) => {
            section.push_str(message);
            section.push_str("\n\n");
        }
        None => section.push_str("No outputs available.\n\n"),
    }

    for file in &outputs.files {
        section.push_str(&format!("![Agent file]({})\n\n", file));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by ReviewScope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render a report in the requested format and write it to disk.
pub fn save_report(report: &Report, path: &Path, json: bool) -> Result<()> {
    let content = if json {
        generate_json_report(report)?
    } else {
        generate_markdown_report(report)
    };

    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnalysisResult, SentimentAnalysis, SentimentCounts, SentimentSamples,
    };
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            product_id: "HT-1000".to_string(),
            analysis_date: Utc::now(),
            model_used: Some("gpt-4o-mini".to_string()),
            products_file: "products.json".to_string(),
            reviews_file: "reviews.json".to_string(),
            duration_seconds: 2.5,
        };

        let summary = ProductSummary {
            product_name: "Heater".to_string(),
            description: "Space heater".to_string(),
            price: 49.99,
            average_rating: 3.0,
            total_reviews: 2,
            sentiment_analysis: SentimentAnalysis {
                counts: SentimentCounts {
                    positive: 1,
                    neutral: 0,
                    negative: 1,
                },
                samples: SentimentSamples {
                    positive_summary: "great heater works well".to_string(),
                    negative_summary: "broke after a week bad".to_string(),
                },
            },
            common_keywords: vec![("great".to_string(), 1), ("heater".to_string(), 1)],
        };

        Report {
            metadata,
            result: AnalysisResult {
                product_id: "HT-1000".to_string(),
                product_summary: summary,
                rating_histogram: RatingHistogram::from_ratings(vec![5, 1]),
                bar_chart: Some("charts/rating_distribution_HT-1000.svg".to_string()),
                pie_chart: None,
                outputs: Some(AgentOutputs {
                    run_status: "completed".to_string(),
                    message: Some("Customers are split.".to_string()),
                    files: vec![],
                }),
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Product Analysis: Heater"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("**Average Rating:** 3.00 from 2 reviews"));
        assert!(markdown.contains("| ★★★★★ | 1 |"));
        assert!(markdown.contains("great heater works well"));
        assert!(markdown.contains("| `heater` | 1 |"));
        assert!(markdown.contains("rating_distribution_HT-1000.svg"));
        assert!(!markdown.contains("Sentiment analysis]("));
        assert!(markdown.contains("Customers are split."));
    }

    #[test]
    fn test_agent_section_without_message() {
        let outputs = AgentOutputs {
            run_status: "completed".to_string(),
            message: None,
            files: vec!["charts/file_1_image_file.png".to_string()],
        };
        let section = generate_agent_section(Some(&outputs));
        assert!(section.contains("No outputs available."));
        assert!(section.contains("file_1_image_file.png"));
        assert!(generate_agent_section(None).is_empty());
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"product_summary\""));
        assert!(json.contains("\"average_rating\": 3.0"));
        assert!(json.contains("\"pie_chart\": null"));
    }

    #[test]
    fn test_save_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        save_report(&create_test_report(), &path, false).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Product Analysis"));
    }
}
