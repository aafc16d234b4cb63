//! ReviewScope - product review analyzer
//!
//! Aggregates product reviews into rating, sentiment and keyword
//! statistics, renders charts, and asks a remote AI agent for a
//! narrative. Runs once for a single product or hosts an HTTP API.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration, data or runtime error

mod agent;
mod analysis;
mod catalog;
mod charts;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod server;
mod workflow;

use agent::{AgentBridge, AgentClient};
use analysis::LexiconScorer;
use anyhow::{Context, Result};
use catalog::Catalog;
use charts::SvgChartRenderer;
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, Credentials, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use workflow::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may live in a local .env file
    dotenv::dotenv().ok();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("ReviewScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let outcome = if args.serve {
        run_server(&args).await
    } else {
        run_script(&args).await
    };

    if let Err(e) = outcome {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .reviewscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize data paths, agent model, charts and server.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default()? {
            Some(config) => {
                info!("Loaded default config from {}", CONFIG_FILE_NAME);
                config
            }
            None => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Build the request context: data snapshot, scorer, renderer and agent.
///
/// Missing data files or a missing credential are fatal here.
fn build_context(config: &Config, skip_agent: bool) -> Result<AppContext> {
    let catalog = Catalog::open(
        config.data.products_path.clone(),
        config.data.reviews_path.clone(),
    )
    .context("Failed to load product or review data")?;

    let renderer = SvgChartRenderer::new(
        config.charts.output_dir.clone(),
        config.charts.width,
        config.charts.height,
    );

    let agent: Option<Arc<dyn AgentBridge>> = if skip_agent {
        info!("Agent step disabled");
        None
    } else {
        let credentials = Credentials::from_env()?;
        let client = AgentClient::from_connection_string(
            config.agent_config(),
            &credentials.connection,
            credentials.access_token,
        )?;
        Some(Arc::new(client))
    };

    Ok(AppContext::new(
        catalog,
        Arc::new(LexiconScorer),
        Arc::new(renderer),
        agent,
    ))
}

/// Host the HTTP API.
async fn run_server(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let ctx = Arc::new(build_context(&config, args.skip_agent)?);

    println!(
        "🌐 Serving on http://{}/analyze/{{product_id}}",
        config.server.bind_address()
    );
    server::serve(ctx, &config.charts.output_dir, &config.server.bind_address()).await
}

/// Analyze a single product, print the summary and save a report.
async fn run_script(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let ctx = build_context(&config, args.skip_agent)?;

    let product_id = args.product.as_deref().unwrap_or_default().trim();

    println!("🔬 Analyzing product {}...", product_id);
    if let Some(model) = ctx.model_name() {
        println!("   Agent model: {}", model);
        println!("   Timeout: {}s", config.agent.timeout_seconds);
    }

    let spinner = if args.quiet {
        None
    } else {
        Some(create_spinner(ctx.agent.is_some()))
    };

    let outcome = ctx.analyze_product(product_id).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let result = outcome?;

    let summary = &result.product_summary;
    println!(
        "Product Summary: {}",
        serde_json::to_string_pretty(summary).context("Failed to serialize summary")?
    );

    let report = Report {
        metadata: ReportMetadata {
            product_id: result.product_id.clone(),
            analysis_date: Utc::now(),
            model_used: ctx.model_name(),
            products_file: ctx.catalog.products_path().display().to_string(),
            reviews_file: ctx.catalog.reviews_path().display().to_string(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        result,
    };

    let output_path = args.output_path(product_id);
    report::save_report(&report, &output_path, args.format == OutputFormat::Json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let counts = &report.result.product_summary.sentiment_analysis.counts;
    println!("\n📊 Analysis Summary:");
    println!(
        "   Average rating: {:.2} ({} reviews)",
        report.result.product_summary.average_rating,
        report.result.product_summary.total_reviews
    );
    println!(
        "   👍 Positive: {} | 😐 Neutral: {} | 👎 Negative: {}",
        counts.positive, counts.neutral, counts.negative
    );
    for chart in [&report.result.bar_chart, &report.result.pie_chart]
        .into_iter()
        .flatten()
    {
        println!("   Chart: {}", chart);
    }
    if let Some(ref outputs) = report.result.outputs {
        println!("   Agent run: {}", outputs.run_status);
    }
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(())
}

fn create_spinner(with_agent: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(if with_agent {
        "Aggregating reviews and waiting for the agent..."
    } else {
        "Aggregating reviews..."
    });
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
