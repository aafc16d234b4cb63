//! Prompt construction for the agent.

use crate::models::ProductSummary;

/// Build the user prompt for a product analysis.
///
/// The computed summary is embedded as JSON so the agent narrates the
/// numbers we already have instead of guessing.
pub fn build_prompt(product_id: &str, summary: &ProductSummary) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Analyze product {} and generate visualizations.\n\n",
        product_id
    ));
    prompt.push_str("The review data has already been aggregated:\n\n");

    match serde_json::to_string_pretty(summary) {
        Ok(json) => {
            prompt.push_str("```json\n");
            prompt.push_str(&json);
            prompt.push_str("\n```\n\n");
        }
        Err(_) => {
            prompt.push_str(&format!(
                "Product: {}\nAverage rating: {:.2}\nTotal reviews: {}\n\n",
                summary.product_name, summary.average_rating, summary.total_reviews
            ));
        }
    }

    prompt.push_str(
        "Write a short narrative covering overall customer satisfaction, \
         what reviewers praise, what they complain about, and any suggested \
         improvements. Create a bar chart of the rating distribution and a \
         pie chart of the sentiment split using the code interpreter.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentAnalysis;

    #[test]
    fn test_prompt_embeds_summary() {
        let summary = ProductSummary {
            product_name: "Heater".to_string(),
            description: "Space heater".to_string(),
            price: 49.99,
            average_rating: 3.0,
            total_reviews: 2,
            sentiment_analysis: SentimentAnalysis::default(),
            common_keywords: vec![("heater".to_string(), 1)],
        };

        let prompt = build_prompt("HT-1000", &summary);
        assert!(prompt.starts_with("Analyze product HT-1000"));
        assert!(prompt.contains("\"product_name\": \"Heater\""));
        assert!(prompt.contains("\"total_reviews\": 2"));
        assert!(prompt.contains("code interpreter"));
    }
}
