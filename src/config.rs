//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.reviewscope.toml` files and reading secrets from the environment.

use crate::agent::{AgentConfig, ConnectionString};
use crate::error::{AppError, AppResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".reviewscope.toml";

/// Environment variable holding the agent project connection string.
pub const CONNECTION_STRING_VAR: &str = "PROJECT_CONNECTION_STRING";

/// Environment variable holding an optional bearer token for the agent service.
pub const ACCESS_TOKEN_VAR: &str = "AGENT_ACCESS_TOKEN";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Agent settings.
    #[serde(default)]
    pub agent: AgentSettings,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Input data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_products_path")]
    pub products_path: PathBuf,

    #[serde(default = "default_reviews_path")]
    pub reviews_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            products_path: default_products_path(),
            reviews_path: default_reviews_path(),
        }
    }
}

fn default_products_path() -> PathBuf {
    PathBuf::from("products.json")
}

fn default_reviews_path() -> PathBuf {
    PathBuf::from("reviews.json")
}

/// Remote agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model deployment the agent is created with.
    #[serde(default = "default_model")]
    pub model: String,

    /// Display name of the created agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// System instructions for the agent.
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// REST API version sent with every request.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request and run timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Delay between run status checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Save image files produced by the agent next to the charts.
    #[serde(default = "default_true")]
    pub download_files: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            name: default_agent_name(),
            instructions: default_instructions(),
            api_version: default_api_version(),
            timeout_seconds: default_timeout(),
            poll_interval_ms: default_poll_interval(),
            download_files: true,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_agent_name() -> String {
    "orchestrator-agent".to_string()
}

fn default_instructions() -> String {
    "Coordinate tasks for product and review analysis.".to_string()
}

fn default_api_version() -> String {
    "2024-12-01-preview".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Directory chart files are written to.
    #[serde(default = "default_chart_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: default_chart_dir(),
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    600
}

/// HTTP hosting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7071
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_optional(Path::new(CONFIG_FILE_NAME))
    }

    /// Load `path` if it exists. A file that exists but does not parse is an error.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref products) = args.products {
            self.data.products_path = products.clone();
        }
        if let Some(ref reviews) = args.reviews {
            self.data.reviews_path = reviews.clone();
        }

        if let Some(ref model) = args.model {
            self.agent.model = model.clone();
        }
        if let Some(timeout) = args.timeout {
            self.agent.timeout_seconds = timeout;
        }

        if let Some(ref dir) = args.charts_dir {
            self.charts.output_dir = dir.clone();
        }

        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
    }

    /// Agent client settings derived from this configuration.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            model_name: self.agent.model.clone(),
            agent_name: self.agent.name.clone(),
            instructions: self.agent.instructions.clone(),
            api_version: self.agent.api_version.clone(),
            timeout_seconds: self.agent.timeout_seconds,
            poll_interval_ms: self.agent.poll_interval_ms,
            download_dir: if self.agent.download_files {
                Some(self.charts.output_dir.clone())
            } else {
                None
            },
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Agent credentials read from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub connection: ConnectionString,
    pub access_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CONNECTION_STRING_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Environment variable '{}' is not set. Please check your .env file.",
                    CONNECTION_STRING_VAR
                ))
            })?;

        Ok(Self {
            connection: raw.parse()?,
            access_token: lookup(ACCESS_TOKEN_VAR).filter(|v| !v.trim().is_empty()),
        })
    }
}
