//! Chart rendering.
//!
//! Turns the rating histogram and sentiment counts of a product into two
//! image files. Rendering sits behind [`ChartRenderer`]; the bundled
//! [`SvgChartRenderer`] writes self-contained SVG documents.

pub mod svg;

use crate::error::AppResult;
use crate::models::{RatingHistogram, SentimentCounts};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{info, warn};

pub use svg::SvgChartRenderer;

/// Something that can draw the two product charts.
pub trait ChartRenderer: Send + Sync {
    /// Draw the rating distribution bar chart and return its path.
    fn render_rating_distribution(
        &self,
        product_id: &str,
        histogram: &RatingHistogram,
    ) -> AppResult<PathBuf>;

    /// Draw the sentiment pie chart and return its path.
    fn render_sentiment(&self, product_id: &str, counts: &SentimentCounts) -> AppResult<PathBuf>;
}

/// Paths of the rendered charts; `None` where rendering failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartArtifacts {
    pub bar_chart: Option<String>,
    pub pie_chart: Option<String>,
}

/// Render both charts, logging and skipping any that fail.
pub fn render_charts(
    renderer: &dyn ChartRenderer,
    product_id: &str,
    histogram: &RatingHistogram,
    counts: &SentimentCounts,
) -> ChartArtifacts {
    let bar_chart = match renderer.render_rating_distribution(product_id, histogram) {
        Ok(path) => {
            info!("Saved chart to: {}", path.display());
            Some(path_string(path))
        }
        Err(e) => {
            warn!("Error generating bar chart: {}", e);
            None
        }
    };

    let pie_chart = match renderer.render_sentiment(product_id, counts) {
        Ok(path) => {
            info!("Saved chart to: {}", path.display());
            Some(path_string(path))
        }
        Err(e) => {
            warn!("Error generating pie chart: {}", e);
            None
        }
    };

    ChartArtifacts {
        bar_chart,
        pie_chart,
    }
}

// Forward slashes so the path doubles as a URL
fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// File-name-safe form of a product id.
///
/// Ids that needed replacing get a short digest of the original appended,
/// so two ids never share a file name.
pub fn sanitize_id(product_id: &str) -> String {
    let sanitized: String = product_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized == product_id {
        return sanitized;
    }

    let mut hasher = Sha256::new();
    hasher.update(product_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", sanitized, &digest[..8])
}

/// File name of the rating bar chart.
pub fn rating_chart_name(product_id: &str, extension: &str) -> String {
    format!("rating_distribution_{}.{}", sanitize_id(product_id), extension)
}

/// File name of the sentiment pie chart.
pub fn sentiment_chart_name(product_id: &str, extension: &str) -> String {
    format!("sentiment_analysis_{}.{}", sanitize_id(product_id), extension)
}
