//! OpenAI-compatible chat-completions transformer
//!
//! Sends each statement as one `POST {endpoint}/chat/completions` request
//! and returns the first choice's message content.

use std::fmt;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{Dialect, Error, Result, Transformer};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Longest error body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`ChatCompletionsTransformer`].
#[derive(Clone)]
pub struct ChatSettings {
    /// Base URL, without the `/chat/completions` path
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Give up retrying transient failures after this long
    pub max_elapsed: Duration,
}

impl ChatSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for ChatSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_elapsed", &self.max_elapsed)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// System message naming the migration direction.
pub fn system_prompt(source: &Dialect, target: &Dialect) -> String {
    format!(
        "You are an expert in SQL migration from {} to {}.",
        source.display_name(),
        target.display_name()
    )
}

/// User message carrying the statement and the output rules.
pub fn user_prompt(sql: &str, source: &Dialect, target: &Dialect) -> String {
    format!(
        "You are an expert in SQL migration. Convert the following SQL from {} to {}.\n\
         \n\
         This SQL is used inside a MyBatis XML file. Only return the converted SQL query \
         itself, without any explanation, markdown formatting, or comments.\n\
         \n\
         - Do not wrap with ```sql\n\
         - Do not add any comments or descriptions\n\
         - Do not change MyBatis variables like #{{param}} or ${{param}}\n\
         - Keep any XML tags such as <if>, <where> or <include> exactly as they are\n\
         - Preserve indentation as much as possible\n\
         \n\
         SQL:\n\
         {}\n",
        source.display_name(),
        target.display_name(),
        sql
    )
}

/// Transformer backed by a chat-completions HTTP API.
#[derive(Debug)]
pub struct ChatCompletionsTransformer {
    settings: ChatSettings,
    client: Client,
}

impl ChatCompletionsTransformer {
    pub fn new(settings: ChatSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey {
                var: "api_key".to_string(),
            });
        }
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        )
    }

    fn request_once(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(Error::EmptyResponse)
    }
}

impl Transformer for ChatCompletionsTransformer {
    fn transform(&self, sql: &str, source: &Dialect, target: &Dialect) -> Result<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage::new("system", system_prompt(source, target)),
                ChatMessage::new("user", user_prompt(sql, source, target)),
            ],
            temperature: 0.0,
        };

        let policy = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(self.settings.max_elapsed))
            .build();

        let mut attempt = 0u32;
        backoff::retry(policy, || {
            attempt += 1;
            self.request_once(&request).map_err(|e| {
                if e.is_transient() {
                    tracing::debug!(attempt, error = %e, "transient transform failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .map_err(|e| match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialects() -> (Dialect, Dialect) {
        ("oracle".parse().unwrap(), "postgresql".parse().unwrap())
    }

    #[test]
    fn test_user_prompt_keeps_placeholders_literal() {
        let (source, target) = dialects();
        let prompt = user_prompt("SELECT * FROM t WHERE id = #{id}", &source, &target);
        assert!(prompt.contains("from ORACLE to POSTGRESQL"));
        assert!(prompt.contains("#{param} or ${param}"));
        assert!(prompt.ends_with("SQL:\nSELECT * FROM t WHERE id = #{id}\n"));
    }

    #[test]
    fn test_settings_debug_hides_key() {
        let settings = ChatSettings::new("sk-secret");
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            ChatCompletionsTransformer::new(ChatSettings::new("  ")),
            Err(Error::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_url_joins_endpoint() {
        let mut settings = ChatSettings::new("k");
        settings.endpoint = "http://localhost:8080/v1/".to_string();
        let transformer = ChatCompletionsTransformer::new(settings).unwrap();
        assert_eq!(transformer.url(), "http://localhost:8080/v1/chat/completions");
    }
}
