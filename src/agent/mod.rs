// agent module: AI coding-agent port, HTTP adapter, and test stub

mod client;
pub mod stub;

use anyhow::Result;
use async_trait::async_trait;

pub use client::OpenCodeClient;
pub use stub::StubAgent;

/// Text produced by the agent plus the session it ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    pub session_id: String,
}

/// An AI coding assistant reachable over the network.
#[async_trait]
pub trait CodingAgent: Send + Sync {
    /// Send `prompt` to `model` (`provider/model`).
    ///
    /// Continues `session` when given, otherwise opens a new one.
    async fn ask(&self, prompt: &str, model: &str, session: Option<&str>) -> Result<AgentReply>;
}
