//! Unified OpenAI-compatible provider client.
//!
//! One struct that handles both embeddings and chat completions for
//! any OpenAI-compatible API. Providers differ only by endpoint URL
//! and API key; the default is OpenRouter.

use askcorpus_core::config::AskCorpusConfig;
use askcorpus_core::error::{AskCorpusError, Result};
use askcorpus_core::traits::{CompletionBackend, EmbeddingBackend};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// Default API base URL when the config leaves `embedding.endpoint` empty.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Environment variables consulted for the API key, in order.
const API_KEY_ENV_VARS: &[&str] = &["OPENROUTER_API_KEY", "OPENAI_API_KEY"];

/// Request timeout applied to every provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for any OpenAI-compatible API, serving both the embedding
/// and the completion boundary.
pub struct OpenAiCompatibleClient {
    /// Provider name used in error messages (e.g. "openrouter").
    name: String,
    api_key: String,
    base_url: String,
    embedding_model: String,
    chat_model: String,
    max_tokens: u32,
    temperature: f32,
    /// Optional OpenRouter attribution headers.
    site_url: String,
    site_name: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Build a client from configuration.
    ///
    /// Resolution order for the API key: `config.embedding.api_key` >
    /// `OPENROUTER_API_KEY` > `OPENAI_API_KEY` > empty. An empty key is
    /// tolerated at construction time and rejected at call time, so
    /// offline commands keep working without credentials.
    pub fn from_config(config: &AskCorpusConfig) -> Result<Self> {
        let api_key = if !config.embedding.api_key.is_empty() {
            config.embedding.api_key.clone()
        } else {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        let base_url = if config.embedding.endpoint.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.embedding.endpoint.trim_end_matches('/').to_string()
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AskCorpusError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: "openrouter".to_string(),
            api_key,
            base_url,
            embedding_model: config.embedding.model.clone(),
            chat_model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            site_url: config.embedding.site_url.clone(),
            site_name: config.embedding.site_name.clone(),
            client,
        })
    }

    fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AskCorpusError::ApiKeyMissing(self.name.clone()));
        }
        Ok(())
    }

    /// Auth plus optional OpenRouter attribution headers.
    fn apply_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut req = req
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key));
        if !self.site_url.is_empty() {
            req = req.header("HTTP-Referer", &self.site_url);
        }
        if !self.site_name.is_empty() {
            req = req.header("X-Title", &self.site_name);
        }
        req
    }
}

/// Extract the embedding matrix from an OpenAI-style response body.
///
/// `data[i].embedding` holds the vector for input i; items carry an
/// explicit `index` field, so rows are reordered by it to keep the
/// one-to-one input/output alignment even if the provider shuffles.
fn parse_embedding_response(body: &Value) -> Result<Vec<Vec<f32>>> {
    let data = body["data"].as_array().ok_or_else(|| {
        AskCorpusError::RetrievalBackend("embedding response has no data array".into())
    })?;

    let mut rows: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(pos);
        let embedding = item["embedding"].as_array().ok_or_else(|| {
            AskCorpusError::RetrievalBackend(format!("embedding missing for data item {pos}"))
        })?;
        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    AskCorpusError::RetrievalBackend(format!(
                        "non-numeric embedding value in data item {pos}"
                    ))
                })
            })
            .collect::<Result<_>>()?;
        rows.push((index, vector));
    }
    rows.sort_by_key(|(index, _)| *index);
    Ok(rows.into_iter().map(|(_, v)| v).collect())
}

/// Extract the answer text from an OpenAI-style chat response body.
fn parse_chat_response(body: &Value) -> Result<String> {
    let choice = body["choices"]
        .get(0)
        .ok_or_else(|| AskCorpusError::UpstreamCompletion("no choices in response".into()))?;
    choice["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| AskCorpusError::UpstreamCompletion("response content is empty".into()))
}

#[async_trait]
impl EmbeddingBackend for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.require_api_key()?;

        let body = json!({
            "model": self.embedding_model,
            "input": texts,
            "encoding_format": "float",
        });

        let url = format!("{}/embeddings", self.base_url);
        let resp = self
            .apply_headers(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AskCorpusError::RetrievalBackend(format!(
                    "{} connection failed ({url}): {e}",
                    self.name
                ))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AskCorpusError::RetrievalBackend(format!(
                "{} embeddings API error {status}: {text}",
                self.name
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AskCorpusError::RetrievalBackend(e.to_string()))?;
        let vectors = parse_embedding_response(&body)?;
        tracing::debug!(count = vectors.len(), model = %self.embedding_model, "embedded batch");
        Ok(vectors)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.require_api_key()?;

        let body = json!({
            "model": self.chat_model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .apply_headers(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AskCorpusError::UpstreamCompletion(format!(
                    "{} connection failed ({url}): {e}",
                    self.name
                ))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AskCorpusError::UpstreamCompletion(format!(
                "{} chat API error {status}: {text}",
                self.name
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AskCorpusError::UpstreamCompletion(e.to_string()))?;
        parse_chat_response(&body)
    }
}
