use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AgentReply, CodingAgent};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Serialize)]
struct ModelRef<'a> {
    #[serde(rename = "providerID")]
    provider_id: &'a str,
    #[serde(rename = "modelID")]
    model_id: &'a str,
}

#[derive(Serialize)]
struct TextPart<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: ModelRef<'a>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`CodingAgent`] for an OpenCode-style HTTP server.
///
/// Sessions are created with `POST /session`; prompts go to
/// `POST /session/{id}/message`.
pub struct OpenCodeClient {
    client: Client,
    base_url: String,
}

impl OpenCodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn create_session(&self) -> Result<String> {
        let url = format!("{}/session", self.base_url);
        let session: SessionResponse = self
            .client
            .post(&url)
            .json(&CreateSessionRequest { title: "board-flow" })
            .send()
            .await
            .with_context(|| format!("connecting to agent at {url}"))?
            .error_for_status()
            .context("agent refused to open a session")?
            .json()
            .await
            .context("parsing agent session response")?;
        tracing::debug!(session = %session.id, "opened agent session");
        Ok(session.id)
    }
}

/// Split `provider/model` into its two halves.
fn split_model(model: &str) -> Result<(&str, &str)> {
    match model.split_once('/') {
        Some((provider, name)) if !provider.is_empty() && !name.is_empty() => Ok((provider, name)),
        _ => bail!("model \"{model}\" must be written as provider/model"),
    }
}

#[async_trait]
impl CodingAgent for OpenCodeClient {
    async fn ask(&self, prompt: &str, model: &str, session: Option<&str>) -> Result<AgentReply> {
        let (provider_id, model_id) = split_model(model)?;
        let session_id = match session {
            Some(id) => id.to_owned(),
            None => self.create_session().await?,
        };

        let url = format!("{}/session/{session_id}/message", self.base_url);
        let request = MessageRequest {
            model: ModelRef {
                provider_id,
                model_id,
            },
            parts: vec![TextPart {
                kind: "text",
                text: prompt,
            }],
        };
        tracing::info!(model, session = %session_id, "prompting agent");

        let response: MessageResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("sending prompt to {url}"))?
            .error_for_status()
            .context("agent rejected the prompt")?
            .json()
            .await
            .context("parsing agent message response")?;

        let text = response
            .parts
            .into_iter()
            .filter(|p| p.kind == "text")
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            bail!("agent returned no text");
        }

        Ok(AgentReply { text, session_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_model_requires_provider_and_name() {
        assert_eq!(split_model("openai/gpt-4o").unwrap(), ("openai", "gpt-4o"));
        assert!(split_model("gpt-4o").is_err());
        assert!(split_model("/gpt-4o").is_err());
        assert!(split_model("openai/").is_err());
    }

    #[test]
    fn message_request_shape() {
        let req = MessageRequest {
            model: ModelRef {
                provider_id: "anthropic",
                model_id: "sonnet",
            },
            parts: vec![TextPart {
                kind: "text",
                text: "hi",
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"]["providerID"], "anthropic");
        assert_eq!(json["model"]["modelID"], "sonnet");
        assert_eq!(json["parts"][0]["type"], "text");
        assert_eq!(json["parts"][0]["text"], "hi");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let c = OpenCodeClient::new("http://localhost:4096/");
        assert_eq!(c.base_url, "http://localhost:4096");
    }
}
