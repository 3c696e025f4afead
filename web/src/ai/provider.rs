use std::time::Duration;

use log::{error, info, warn};
use serde_json::{json, Value};

use super::{prompt, AnalysisLevel, Message, Role};
use crate::config::non_empty;
use crate::error::Error;

/// Value shipped in sample `.env` files; treated as no key at all.
const PLACEHOLDER_KEY: &str = "PLACEHOLDER_PLEASE_REPLACE";

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEEPSEEK_MODEL: &str = "deepseek-chat";
const OPENROUTER_ANALYSIS_MODEL: &str = "google/gemini-2.0-flash-lite-preview-02-05:free";
const OPENROUTER_FALLBACK_MODEL: &str = "google/gemini-flash-1.5";
const OPENROUTER_CHAT_MODEL: &str = "openai/gpt-3.5-turbo";
const GEMINI_ANALYSIS_MODEL: &str = "gemini-1.5-flash";
const GEMINI_CHAT_MODEL: &str = "gemini-pro";

const TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const APP_REFERER: &str = "https://bible-study-app.com";
const APP_TITLE: &str = "Bible Study App";

/// API keys and endpoints of the supported LLM providers.
#[derive(Clone, Debug, Default)]
pub struct AiConfig {
    pub deepseek_key: Option<String>,
    pub openrouter_key: Option<String>,
    pub gemini_key: Option<String>,
    pub deepseek_base_url: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
}

impl AiConfig {
    pub fn from_env() -> Self {
        AiConfig {
            deepseek_key: non_empty("DEEPSEEK_API_KEY"),
            openrouter_key: non_empty("OPENROUTER_API_KEY"),
            gemini_key: non_empty("GEMINI_API_KEY"),
            deepseek_base_url: non_empty("DEEPSEEK_BASE_URL"),
            openrouter_base_url: non_empty("OPENROUTER_BASE_URL"),
            gemini_base_url: non_empty("GEMINI_BASE_URL"),
        }
    }

    /// Picks the provider to use: DeepSeek, then OpenRouter, then Gemini.
    ///
    /// OpenRouter keys are only accepted in their `sk-or-` form; placeholder
    /// keys count as missing.
    pub fn provider(&self) -> Option<Provider> {
        let usable = |key: &Option<String>| {
            key.as_deref()
                .filter(|k| *k != PLACEHOLDER_KEY)
                .map(str::to_string)
        };

        if let Some(key) = usable(&self.deepseek_key) {
            return Some(Provider::DeepSeek {
                key,
                base_url: base_url(&self.deepseek_base_url, DEEPSEEK_BASE_URL),
            });
        }
        if let Some(key) = usable(&self.openrouter_key).filter(|k| k.starts_with("sk-or-")) {
            return Some(Provider::OpenRouter {
                key,
                base_url: base_url(&self.openrouter_base_url, OPENROUTER_BASE_URL),
            });
        }
        usable(&self.gemini_key).map(|key| Provider::Gemini {
            key,
            base_url: base_url(&self.gemini_base_url, GEMINI_BASE_URL),
        })
    }
}

fn base_url(configured: &Option<String>, default: &str) -> String {
    configured
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// A configured LLM provider.
#[derive(Clone, Debug, PartialEq)]
pub enum Provider {
    DeepSeek { key: String, base_url: String },
    OpenRouter { key: String, base_url: String },
    Gemini { key: String, base_url: String },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::DeepSeek { .. } => "DeepSeek",
            Provider::OpenRouter { .. } => "OpenRouter",
            Provider::Gemini { .. } => "Gemini",
        }
    }
}

/// Sends exegesis requests to one provider.
///
/// There is no retry or caching: the only second attempt is OpenRouter's
/// fallback model for analyses.
pub struct Exegete<'a> {
    client: &'a reqwest::Client,
    provider: Provider,
}

impl<'a> Exegete<'a> {
    pub fn new(client: &'a reqwest::Client, provider: Provider) -> Self {
        Exegete { client, provider }
    }

    /// Builds a client with the timeout used for provider calls.
    pub fn http_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to a default HTTP client: {}", e);
                reqwest::Client::new()
            })
    }

    /// Explains the selected text of a verse.
    pub async fn analyze(
        &self,
        text: &str,
        level: AnalysisLevel,
        context: &str,
    ) -> Result<String, Error> {
        let prompt = prompt::analysis(text, level, context);
        let messages = [Message::new(Role::User, prompt)];
        info!("Requesting {:?} analysis from {}", level, self.provider.name());

        match &self.provider {
            Provider::DeepSeek { key, base_url } => {
                self.chat_completion(base_url, key, DEEPSEEK_MODEL, &messages, false)
                    .await
            }
            Provider::OpenRouter { key, base_url } => {
                match self
                    .chat_completion(base_url, key, OPENROUTER_ANALYSIS_MODEL, &messages, true)
                    .await
                {
                    Ok(analysis) => Ok(analysis),
                    Err(e) => {
                        warn!("OpenRouter failed, trying fallback model: {}", e);
                        self.chat_completion(
                            base_url,
                            key,
                            OPENROUTER_FALLBACK_MODEL,
                            &messages,
                            false,
                        )
                        .await
                    }
                }
            }
            Provider::Gemini { key, base_url } => {
                self.generate_content(base_url, key, GEMINI_ANALYSIS_MODEL, &messages)
                    .await
            }
        }
    }

    /// Answers the latest message of a conversation about `context`.
    pub async fn chat(&self, context: &str, history: &[Message]) -> Result<String, Error> {
        let messages = prompt::chat_messages(context, history);
        info!("Requesting chat reply from {}", self.provider.name());

        match &self.provider {
            Provider::DeepSeek { key, base_url } => {
                self.chat_completion(base_url, key, DEEPSEEK_MODEL, &messages, false)
                    .await
            }
            Provider::OpenRouter { key, base_url } => {
                self.chat_completion(base_url, key, OPENROUTER_CHAT_MODEL, &messages, false)
                    .await
            }
            Provider::Gemini { key, base_url } => {
                self.generate_content(base_url, key, GEMINI_CHAT_MODEL, &messages)
                    .await
            }
        }
    }

    /// Calls an OpenAI-style `/chat/completions` endpoint.
    async fn chat_completion(
        &self,
        base_url: &str,
        key: &str,
        model: &str,
        messages: &[Message],
        with_temperature: bool,
    ) -> Result<String, Error> {
        let mut body = json!({
            "model": model,
            "messages": messages,
        });
        if with_temperature || matches!(self.provider, Provider::DeepSeek { .. }) {
            body["temperature"] = json!(TEMPERATURE);
        }

        let mut request = self
            .client
            .post(format!("{}/chat/completions", base_url))
            .bearer_auth(key)
            .json(&body);
        if let Provider::OpenRouter { .. } = self.provider {
            request = request
                .header("HTTP-Referer", APP_REFERER)
                .header("X-Title", APP_TITLE);
        }

        let json = self.send(request).await?;
        Ok(completion_text(&json))
    }

    /// Calls Gemini's `generateContent` with the conversation flattened into
    /// one prompt.
    async fn generate_content(
        &self,
        base_url: &str,
        key: &str,
        model: &str,
        messages: &[Message],
    ) -> Result<String, Error> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt::transcript(messages) }] }]
        });
        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", base_url, model))
            .query(&[("key", key)])
            .json(&body);

        let json = self.send(request).await?;
        Ok(gemini_text(&json))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, Error> {
        let provider = self.provider.name();
        let response = request.send().await.map_err(|e| Error::Ai {
            cause: format!("{} request failed: {}", provider, e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("{} returned {}: {}", provider, status, detail);
            return Err(Error::Ai {
                cause: format!("{} error: {}", provider, status.as_u16()),
            });
        }

        response.json::<Value>().await.map_err(|e| Error::Ai {
            cause: format!("{} returned an unreadable body: {}", provider, e),
        })
    }
}

/// Text of the first choice of a chat completion, or empty.
fn completion_text(json: &Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Text of the first candidate of a Gemini response, or empty.
fn gemini_text(json: &Value) -> String {
    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(deepseek: Option<&str>, openrouter: Option<&str>, gemini: Option<&str>) -> AiConfig {
        AiConfig {
            deepseek_key: deepseek.map(str::to_string),
            openrouter_key: openrouter.map(str::to_string),
            gemini_key: gemini.map(str::to_string),
            ..AiConfig::default()
        }
    }

    #[test]
    fn provider_priority() {
        let all = config(Some("ds"), Some("sk-or-1"), Some("gm"));
        assert_eq!(all.provider().map(|p| p.name()), Some("DeepSeek"));

        let no_deepseek = config(None, Some("sk-or-1"), Some("gm"));
        assert_eq!(no_deepseek.provider().map(|p| p.name()), Some("OpenRouter"));

        let gemini_only = config(None, None, Some("gm"));
        assert_eq!(
            gemini_only.provider(),
            Some(Provider::Gemini {
                key: "gm".to_string(),
                base_url: GEMINI_BASE_URL.to_string()
            })
        );

        assert_eq!(config(None, None, None).provider(), None);
    }

    #[test]
    fn placeholder_and_malformed_keys_are_skipped() {
        let placeholder = config(Some(PLACEHOLDER_KEY), Some("sk-or-1"), None);
        assert_eq!(placeholder.provider().map(|p| p.name()), Some("OpenRouter"));

        let bad_openrouter = config(None, Some("sk-123"), Some("gm"));
        assert_eq!(bad_openrouter.provider().map(|p| p.name()), Some("Gemini"));

        let nothing_usable = config(Some(PLACEHOLDER_KEY), Some("nope"), Some(PLACEHOLDER_KEY));
        assert_eq!(nothing_usable.provider(), None);
    }

    #[test]
    fn base_urls_can_be_overridden() {
        let mut config = config(Some("ds"), None, None);
        config.deepseek_base_url = Some("http://127.0.0.1:9999/".to_string());
        assert_eq!(
            config.provider(),
            Some(Provider::DeepSeek {
                key: "ds".to_string(),
                base_url: "http://127.0.0.1:9999".to_string()
            })
        );
    }

    #[test]
    fn response_text_extraction() {
        let completion = json!({"choices": [{"message": {"content": "<p>Luz</p>"}}]});
        assert_eq!(completion_text(&completion), "<p>Luz</p>");
        assert_eq!(completion_text(&json!({"choices": []})), "");

        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "Paz"}]}}]});
        assert_eq!(gemini_text(&gemini), "Paz");
        assert_eq!(gemini_text(&json!({})), "");
    }
}
