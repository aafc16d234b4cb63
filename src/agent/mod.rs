//! Remote AI-agent bridge.
//!
//! The workflow hands the agent a prompt and gets back text and files.
//! [`AgentBridge`] is the seam; [`AgentClient`] talks to an Azure AI
//! Agents project over REST.

pub mod client;
pub mod prompt;

use crate::error::AppResult;
use crate::models::AgentOutputs;
use async_trait::async_trait;

pub use client::{AgentClient, AgentConfig, ConnectionString};
pub use prompt::build_prompt;

/// Opaque prompt → response exchange with a remote agent.
#[async_trait]
pub trait AgentBridge: Send + Sync {
    /// Run one prompt to completion.
    async fn run(&self, prompt: &str) -> AppResult<AgentOutputs>;

    /// Model the agent runs on.
    fn model_name(&self) -> &str;
}
