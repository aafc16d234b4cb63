//! Per-request analysis workflow.
//!
//! [`AppContext`] bundles the catalog and the external collaborators and
//! is handed to every request. A request runs its steps in order:
//! aggregate, render charts, ask the agent.

use crate::agent::{build_prompt, AgentBridge};
use crate::analysis::{PolarityScorer, ReviewAggregator};
use crate::catalog::Catalog;
use crate::charts::{render_charts, ChartRenderer};
use crate::error::AppResult;
use crate::models::AnalysisResult;
use std::sync::Arc;
use tracing::info;

/// Everything a request needs.
pub struct AppContext {
    pub catalog: Catalog,
    pub scorer: Arc<dyn PolarityScorer>,
    pub renderer: Arc<dyn ChartRenderer>,
    /// `None` disables the agent step.
    pub agent: Option<Arc<dyn AgentBridge>>,
}

impl AppContext {
    pub fn new(
        catalog: Catalog,
        scorer: Arc<dyn PolarityScorer>,
        renderer: Arc<dyn ChartRenderer>,
        agent: Option<Arc<dyn AgentBridge>>,
    ) -> Self {
        Self {
            catalog,
            scorer,
            renderer,
            agent,
        }
    }

    /// Model used by the agent step, if enabled.
    pub fn model_name(&self) -> Option<String> {
        self.agent.as_ref().map(|a| a.model_name().to_string())
    }

    /// Run the full analysis for one product.
    pub async fn analyze_product(&self, product_id: &str) -> AppResult<AnalysisResult> {
        let product_id = product_id.trim();
        let snapshot = self.catalog.snapshot().await;

        let (summary, histogram) = {
            let aggregator = ReviewAggregator::new(&snapshot, self.scorer.as_ref());
            (
                aggregator.analyze(product_id)?,
                aggregator.rating_histogram(product_id)?,
            )
        };
        info!(
            "Analyzed {}: {} reviews, average {:.2}",
            product_id, summary.total_reviews, summary.average_rating
        );

        let charts = render_charts(
            self.renderer.as_ref(),
            product_id,
            &histogram,
            &summary.sentiment_analysis.counts,
        );

        let outputs = match self.agent {
            Some(ref agent) => {
                let prompt = build_prompt(product_id, &summary);
                Some(agent.run(&prompt).await?)
            }
            None => None,
        };

        Ok(AnalysisResult {
            product_id: product_id.to_string(),
            product_summary: summary,
            rating_histogram: histogram,
            bar_chart: charts.bar_chart,
            pie_chart: charts.pie_chart,
            outputs,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::AppError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_full_workflow() {
        let dir = TempDir::new().unwrap();
        let agent = Arc::new(RecordingAgent::default());
        let ctx = context(dir.path(), Some(agent.clone()));

        let result = ctx.analyze_product("HT-1000").await.unwrap();

        assert_eq!(result.product_summary.total_reviews, 2);
        assert_eq!(result.rating_histogram.counts, [1, 0, 0, 0, 1]);
        assert!(result
            .bar_chart
            .as_deref()
            .unwrap()
            .ends_with("rating_distribution_HT-1000.svg"));
        assert!(result
            .pie_chart
            .as_deref()
            .unwrap()
            .ends_with("sentiment_analysis_HT-1000.svg"));
        assert_eq!(
            result.outputs.as_ref().and_then(|o| o.message.as_deref()),
            Some("Mixed feedback.")
        );

        let prompts = agent.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("HT-1000"));
        assert_eq!(ctx.model_name().as_deref(), Some("test-model"));
    }

    #[test]
    fn test_skip_agent() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), None);

        let result = tokio_test::block_on(ctx.analyze_product(" HT-1001 ")).unwrap();
        assert_eq!(result.product_id, "HT-1001");
        assert!(result.outputs.is_none());
        assert_eq!(result.product_summary.sentiment_analysis.counts.neutral, 1);
        assert!(ctx.model_name().is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_skips_agent() {
        let dir = TempDir::new().unwrap();
        let agent = Arc::new(RecordingAgent::default());
        let ctx = context(dir.path(), Some(agent.clone()));

        let err = ctx.analyze_product("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(agent.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_aborts_request() {
        let dir = TempDir::new().unwrap();
        let agent = Arc::new(RecordingAgent {
            fail: true,
            ..Default::default()
        });
        let ctx = context(dir.path(), Some(agent));

        let err = ctx.analyze_product("HT-1000").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
