//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ReviewScope - product review analyzer
///
/// Aggregates ratings, sentiment and keywords for a product, renders
/// charts, and asks a remote AI agent for a narrative summary.
///
/// Examples:
///   reviewscope --product HT-1000
///   reviewscope --product HT-1000 --format json --output ht-1000.json
///   reviewscope --product HT-1000 --skip-agent
///   reviewscope --serve --port 7071
///   reviewscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Product id to analyze (script mode)
    #[arg(
        short,
        long,
        value_name = "ID",
        required_unless_present_any = ["serve", "init_config"],
        conflicts_with = "serve"
    )]
    pub product: Option<String>,

    /// Host the HTTP API instead of analyzing a single product
    #[arg(long)]
    pub serve: bool,

    /// Address to bind in serve mode
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind in serve mode
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to the products JSON file
    #[arg(long, value_name = "FILE", env = "REVIEWSCOPE_PRODUCTS")]
    pub products: Option<PathBuf>,

    /// Path to the reviews JSON file
    #[arg(long, value_name = "FILE", env = "REVIEWSCOPE_REVIEWS")]
    pub reviews: Option<PathBuf>,

    /// Directory charts are written to
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to product_analysis_<ID>.md (or .json with --format json)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Model deployment the agent is created with
    #[arg(short, long, env = "REVIEWSCOPE_MODEL")]
    pub model: Option<String>,

    /// Agent request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the remote agent step (no credential needed)
    #[arg(long)]
    pub skip_agent: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .reviewscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .reviewscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if !self.serve {
            match self.product.as_deref() {
                Some(id) if !id.trim().is_empty() => {}
                _ => return Err("Product id must not be empty".to_string()),
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(port) = self.port {
            if port == 0 {
                return Err("Port must be between 1 and 65535".to_string());
            }
        }

        for path in [&self.products, &self.reviews].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("Data file does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Report path for script mode.
    pub fn output_path(&self, product_id: &str) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "product_analysis_{}.{}",
                crate::charts::sanitize_id(product_id),
                self.format.extension()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            product: Some("HT-1000".to_string()),
            serve: false,
            host: None,
            port: None,
            products: None,
            reviews: None,
            charts_dir: None,
            output: None,
            format: OutputFormat::Markdown,
            model: None,
            timeout: None,
            skip_agent: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_product() {
        let mut args = make_args();
        args.product = Some("   ".to_string());
        assert!(args.validate().is_err());

        args.serve = true;
        args.product = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_data_file() {
        let mut args = make_args();
        args.products = Some(PathBuf::from("/definitely/not/here/products.json"));
        assert!(args.validate().unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_path() {
        let mut args = make_args();
        assert_eq!(
            args.output_path("HT-1000"),
            PathBuf::from("product_analysis_HT-1000.md")
        );

        args.format = OutputFormat::Json;
        assert_eq!(
            args.output_path("HT-1000"),
            PathBuf::from("product_analysis_HT-1000.json")
        );

        args.output = Some(PathBuf::from("out.txt"));
        assert_eq!(args.output_path("HT-1000"), PathBuf::from("out.txt"));
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from(["reviewscope", "--product", "HT-1000", "--format", "json"])
            .unwrap();
        assert_eq!(args.product.as_deref(), Some("HT-1000"));
        assert_eq!(args.format, OutputFormat::Json);

        assert!(Args::try_parse_from(["reviewscope", "--serve", "--product", "X"]).is_err());
        assert!(Args::try_parse_from(["reviewscope"]).is_err());
    }
}
