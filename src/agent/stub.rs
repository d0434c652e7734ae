use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{AgentReply, CodingAgent};

/// A canned-reply agent that records the prompts it receives.
///
/// Replies are served in order; once exhausted every call fails.
#[derive(Default)]
pub struct StubAgent {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(self, text: &str) -> Self {
        self.push(Ok(text.to_owned()))
    }

    pub fn failing(self, message: &str) -> Self {
        self.push(Err(message.to_owned()))
    }

    fn push(self, reply: Result<String, String>) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CodingAgent for StubAgent {
    async fn ask(&self, prompt: &str, _model: &str, session: Option<&str>) -> Result<AgentReply> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());
        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(AgentReply {
                text,
                session_id: session.unwrap_or("stub-session").to_owned(),
            }),
            Some(Err(message)) => bail!("{message}"),
            None => bail!("stub agent has no reply left"),
        }
    }
}
