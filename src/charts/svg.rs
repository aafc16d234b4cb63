//! SVG chart output.

use crate::charts::{rating_chart_name, sentiment_chart_name, ChartRenderer};
use crate::error::{AppError, AppResult};
use crate::models::{RatingHistogram, SentimentCounts};
use std::f64::consts::PI;
use std::path::PathBuf;
use tracing::debug;

const BAR_COLOR: &str = "skyblue";
const PIE_START_ANGLE: f64 = 140.0;

/// Writes charts as SVG files into an output directory.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            width,
            height,
        }
    }

    fn write(&self, file_name: &str, document: &str) -> AppResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::ExternalService(format!(
                "cannot create chart directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let path = self.output_dir.join(file_name);
        std::fs::write(&path, document).map_err(|e| {
            AppError::ExternalService(format!("cannot write {}: {}", path.display(), e))
        })?;

        debug!("Wrote {} bytes to {}", document.len(), path.display());
        Ok(path)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render_rating_distribution(
        &self,
        product_id: &str,
        histogram: &RatingHistogram,
    ) -> AppResult<PathBuf> {
        let title = format!("Ratings Distribution for Product ID: {}", product_id);
        let document = bar_chart_svg(&title, histogram, self.width, self.height);
        self.write(&rating_chart_name(product_id, "svg"), &document)
    }

    fn render_sentiment(&self, product_id: &str, counts: &SentimentCounts) -> AppResult<PathBuf> {
        let title = format!("Sentiment Analysis for Product ID: {}", product_id);
        let document = pie_chart_svg(&title, counts, self.width, self.height);
        self.write(&sentiment_chart_name(product_id, "svg"), &document)
    }
}

/// Build the rating bar chart document.
pub fn bar_chart_svg(title: &str, histogram: &RatingHistogram, width: u32, height: u32) -> String {
    let (w, h) = (f64::from(width), f64::from(height));
    let (left, right, top, bottom) = (60.0, 20.0, 50.0, 50.0);
    let plot_w = w - left - right;
    let plot_h = h - top - bottom;

    // At least one unit so an empty histogram still has an axis
    let y_max = histogram.peak().max(1);
    let slot = plot_w / 5.0;
    let bar_w = slot * 0.8;

    let mut svg = String::new();
    svg.push_str(&svg_header(width, height));
    svg.push_str(&title_text(title, w));

    // Axes
    svg.push_str(&format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\"/>\n",
        left,
        top + plot_h,
        left + plot_w,
        top + plot_h
    ));
    svg.push_str(&format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\"/>\n",
        left,
        top,
        left,
        top + plot_h
    ));

    // Y ticks
    for tick in y_ticks(y_max) {
        let y = top + plot_h - plot_h * tick as f64 / y_max as f64;
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{}</text>\n",
            left - 6.0,
            y + 4.0,
            tick
        ));
    }

    for (rating, count) in histogram.buckets() {
        let index = f64::from(rating - 1);
        let x = left + slot * index + (slot - bar_w) / 2.0;
        let bar_h = plot_h * count as f64 / y_max as f64;
        let y = top + plot_h - bar_h;

        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{}: {}</title></rect>\n",
            x, y, bar_w, bar_h, BAR_COLOR, rating, count
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n",
            x + bar_w / 2.0,
            top + plot_h + 18.0,
            rating
        ));
    }

    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">Ratings</text>\n",
        left + plot_w / 2.0,
        h - 12.0
    ));
    svg.push_str(&format!(
        "<text x=\"16\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" transform=\"rotate(-90 16 {:.1})\">Count</text>\n",
        top + plot_h / 2.0,
        top + plot_h / 2.0
    ));

    svg.push_str("</svg>\n");
    svg
}

/// Build the sentiment pie chart document.
pub fn pie_chart_svg(title: &str, counts: &SentimentCounts, width: u32, height: u32) -> String {
    let (w, h) = (f64::from(width), f64::from(height));
    let cx = w / 2.0;
    let cy = h / 2.0 + 15.0;
    let radius = (w.min(h) / 2.0 - 60.0).max(10.0);

    let mut svg = String::new();
    svg.push_str(&svg_header(width, height));
    svg.push_str(&title_text(title, w));

    let total = counts.total();
    if total == 0 {
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"none\" stroke=\"#cccccc\"/>\n",
            cx, cy, radius
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"middle\">No reviews</text>\n",
            cx, cy
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let mut start = PIE_START_ANGLE;
    for (sentiment, count) in counts.slices() {
        if count == 0 {
            continue;
        }

        let share = count as f64 / total as f64;
        let sweep = 360.0 * share;
        let end = start + sweep;

        if count == total {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\"/>\n",
                cx,
                cy,
                radius,
                sentiment.color()
            ));
        } else {
            let (x1, y1) = polar(cx, cy, radius, start);
            let (x2, y2) = polar(cx, cy, radius, end);
            let large_arc = if sweep > 180.0 { 1 } else { 0 };
            // Counter-clockwise on screen is sweep-flag 0
            svg.push_str(&format!(
                "<path d=\"M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 0 {:.2} {:.2} Z\" fill=\"{}\"/>\n",
                cx, cy, x1, y1, radius, radius, large_arc, x2, y2, sentiment.color()
            ));
        }

        let mid = start + sweep / 2.0;
        let (lx, ly) = polar(cx, cy, radius * 1.15, mid);
        let (px, py) = polar(cx, cy, radius * 0.6, mid);
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">{}</text>\n",
            lx, ly, sentiment
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">{:.1}%</text>\n",
            px,
            py,
            share * 100.0
        ));

        start = end;
    }

    svg.push_str("</svg>\n");
    svg
}

fn svg_header(width: u32, height: u32) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n",
        w = width,
        h = height
    )
}

fn title_text(title: &str, width: f64) -> String {
    format!(
        "<text x=\"{:.1}\" y=\"28\" font-size=\"16\" text-anchor=\"middle\">{}</text>\n",
        width / 2.0,
        escape_xml(title)
    )
}

/// Point on a circle; angles in degrees, counter-clockwise from 3 o'clock.
fn polar(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees * PI / 180.0;
    (cx + r * radians.cos(), cy - r * radians.sin())
}

/// Integer tick values from 0 to `max`, at most about six of them.
fn y_ticks(max: usize) -> Vec<usize> {
    let step = ((max as f64) / 5.0).ceil().max(1.0) as usize;
    (0..=max).step_by(step).collect()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
