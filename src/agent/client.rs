//! Azure AI Agents REST client.
//!
//! One call to [`AgentClient::run`] creates an agent, opens a thread,
//! posts the prompt, waits for the run, collects the reply and deletes
//! the agent again.

use crate::agent::AgentBridge;
use crate::charts::sanitize_id;
use crate::error::{AppError, AppResult};
use crate::models::AgentOutputs;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for the agent client.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model_name: String,
    pub agent_name: String,
    pub instructions: String,
    pub api_version: String,
    pub timeout_seconds: u64,
    pub poll_interval_ms: u64,
    /// Where to save image files the agent produces. `None` skips downloads.
    pub download_dir: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            agent_name: "orchestrator-agent".to_string(),
            instructions: "Coordinate tasks for product and review analysis.".to_string(),
            api_version: "2024-12-01-preview".to_string(),
            timeout_seconds: 300,
            poll_interval_ms: 1000,
            download_dir: None,
        }
    }
}

/// Parsed `PROJECT_CONNECTION_STRING`.
///
/// Format: `<host>;<subscription_id>;<resource_group>;<project_name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl FromStr for ConnectionString {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(';').map(str::trim).collect();

        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(AppError::Configuration(
                "PROJECT_CONNECTION_STRING must look like \
                 '<host>;<subscription_id>;<resource_group>;<project_name>'"
                    .to_string(),
            ));
        }

        let host = parts[0]
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            subscription_id: parts[1].to_string(),
            resource_group: parts[2].to_string(),
            project_name: parts[3].to_string(),
        })
    }
}

impl ConnectionString {
    /// Base URL of the agents endpoint for this project.
    pub fn base_url(&self) -> String {
        format!(
            "https://{}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.host, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest<'a> {
    model: &'a str,
    name: &'a str,
    instructions: &'a str,
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct EmptyBody {}

/// Any object the service returns with an id.
#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFileContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ImageFileContent {
    file_id: String,
}

/// REST client for a remote agent project.
pub struct AgentClient {
    config: AgentConfig,
    http_client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl AgentClient {
    /// Create a client against an explicit base URL.
    pub fn new(
        config: AgentConfig,
        base_url: impl Into<String>,
        access_token: Option<String>,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(
            "Initializing agent client with model {} at {}",
            config.model_name, base_url
        );

        Ok(Self {
            config,
            http_client,
            base_url,
            access_token,
        })
    }

    /// Create a client for the project named by a connection string.
    pub fn from_connection_string(
        config: AgentConfig,
        connection: &ConnectionString,
        access_token: Option<String>,
    ) -> AppResult<Self> {
        Self::new(config, connection.base_url(), access_token)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http_client
            .request(method, url)
            .query(&[("api-version", self.config.api_version.as_str())]);

        match self.access_token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "agent service error {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let response = self.send(builder).await?;
        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("failed to parse agent service response: {}", e))
        })
    }

    async fn create_agent(&self) -> AppResult<String> {
        let body = CreateAgentRequest {
            model: &self.config.model_name,
            name: &self.config.agent_name,
            instructions: &self.config.instructions,
            tools: vec![ToolDefinition {
                kind: "code_interpreter",
            }],
        };

        let created: Created = self
            .send_json(self.request(reqwest::Method::POST, "/assistants").json(&body))
            .await?;
        info!("Created orchestrator agent: {}", created.id);
        Ok(created.id)
    }

    async fn delete_agent(&self, agent_id: &str) -> AppResult<()> {
        let path = format!("/assistants/{}", agent_id);
        self.send(self.request(reqwest::Method::DELETE, &path)).await?;
        info!("Deleted orchestrator agent: {}", agent_id);
        Ok(())
    }

    async fn create_thread(&self) -> AppResult<String> {
        let created: Created = self
            .send_json(self.request(reqwest::Method::POST, "/threads").json(&EmptyBody {}))
            .await?;
        info!("Created thread: {}", created.id);
        Ok(created.id)
    }

    async fn create_message(&self, thread_id: &str, prompt: &str) -> AppResult<String> {
        let path = format!("/threads/{}/messages", thread_id);
        let body = CreateMessageRequest {
            role: "user",
            content: prompt,
        };

        let created: Created = self
            .send_json(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        debug!("Created message in thread: {}", created.id);
        Ok(created.id)
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> AppResult<RunObject> {
        let path = format!("/threads/{}/runs", thread_id);
        let body = CreateRunRequest {
            assistant_id: agent_id,
        };
        self.send_json(self.request(reqwest::Method::POST, &path).json(&body))
            .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> AppResult<RunObject> {
        let path = format!("/threads/{}/runs/{}", thread_id, run_id);
        self.send_json(self.request(reqwest::Method::GET, &path))
            .await
    }

    /// Poll a run until it leaves the queued/in-progress states.
    async fn wait_for_run(&self, thread_id: &str, mut run: RunObject) -> AppResult<RunObject> {
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_seconds);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        while matches!(run.status.as_str(), "queued" | "in_progress" | "cancelling") {
            if Instant::now() >= deadline {
                return Err(AppError::ExternalService(format!(
                    "agent run {} did not finish within {}s",
                    run.id, self.config.timeout_seconds
                )));
            }

            tokio::time::sleep(interval).await;
            run = self.get_run(thread_id, &run.id).await?;
            debug!("Run {} status: {}", run.id, run.status);
        }

        info!("Run status: {}", run.status);
        Ok(run)
    }

    async fn list_messages(&self, thread_id: &str) -> AppResult<Vec<ThreadMessage>> {
        let path = format!("/threads/{}/messages", thread_id);
        let list: MessageList = self
            .send_json(
                self.request(reqwest::Method::GET, &path)
                    .query(&[("order", "desc")]),
            )
            .await?;
        Ok(list.data)
    }

    async fn download_file(&self, file_id: &str) -> AppResult<Option<String>> {
        let Some(ref dir) = self.config.download_dir else {
            return Ok(None);
        };

        let path = format!("/files/{}/content", file_id);
        let bytes = self
            .send(self.request(reqwest::Method::GET, &path))
            .await?
            .bytes()
            .await?;

        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::ExternalService(format!("cannot create {}: {}", dir.display(), e))
        })?;
        let target = dir.join(format!("{}_image_file.png", sanitize_id(file_id)));
        std::fs::write(&target, &bytes).map_err(|e| {
            AppError::ExternalService(format!("cannot write {}: {}", target.display(), e))
        })?;

        info!("Saved image file to: {}", target.display());
        Ok(Some(target.to_string_lossy().replace('\\', "/")))
    }

    async fn run_on_agent(&self, agent_id: &str, prompt: &str) -> AppResult<AgentOutputs> {
        let thread_id = self.create_thread().await?;
        self.create_message(&thread_id, prompt).await?;

        let run = self.create_run(&thread_id, agent_id).await?;
        let run = self.wait_for_run(&thread_id, run).await?;

        if run.status != "completed" {
            let detail = run
                .last_error
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code.unwrap_or_else(|| "error".to_string()),
                        e.message.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| "no error details".to_string());
            return Err(AppError::ExternalService(format!(
                "agent run ended with status {} ({})",
                run.status, detail
            )));
        }

        let messages = self.list_messages(&thread_id).await?;
        let (message, file_ids) = collect_reply(&messages);

        let mut files = Vec::new();
        for file_id in &file_ids {
            if let Some(path) = self.download_file(file_id).await? {
                files.push(path);
            }
        }

        Ok(AgentOutputs {
            run_status: run.status,
            message,
            files,
        })
    }
}

/// Latest assistant text and every image file id in assistant messages.
///
/// `messages` is newest first.
fn collect_reply(messages: &[ThreadMessage]) -> (Option<String>, Vec<String>) {
    let mut text = None;
    let mut file_ids = Vec::new();

    for message in messages.iter().filter(|m| m.role == "assistant") {
        for content in &message.content {
            match content {
                MessageContent::Text { text: t } if text.is_none() => {
                    text = Some(t.value.clone());
                }
                MessageContent::ImageFile { image_file } => {
                    file_ids.push(image_file.file_id.clone());
                }
                _ => {}
            }
        }
    }

    (text, file_ids)
}

#[async_trait]
impl AgentBridge for AgentClient {
    async fn run(&self, prompt: &str) -> AppResult<AgentOutputs> {
        let agent_id = self.create_agent().await?;

        let result = self.run_on_agent(&agent_id, prompt).await;

        // Clean up even when the run failed
        if let Err(e) = self.delete_agent(&agent_id).await {
            warn!("Failed to delete agent {}: {}", agent_id, e);
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
