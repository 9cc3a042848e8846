//! Thin client for the Anthropic Messages API backing the translation and
//! question-answering features.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AiConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const TRANSLATE_MAX_TOKENS: u32 = 400;
const ASK_MAX_TOKENS: u32 = 800;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model returned malformed JSON: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, AiError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

pub struct AiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for AiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AiClient {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate an article title into Japanese with a short practical
    /// summary. The model is instructed to answer with a strict JSON
    /// object; stray code fences are stripped before parsing.
    pub async fn translate(&self, title: &str, description: Option<&str>) -> Result<Translation> {
        let mut prompt = format!(
            "以下の英語のテック記事タイトルを日本語に翻訳し、エンジニア向けの実務的な要約（2〜3文）も生成してください。\n\nタイトル: {}\n",
            title
        );
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            prompt.push_str(&format!("説明: {}\n", description));
        }
        prompt.push_str(
            "\n以下のJSON形式のみで回答してください（他のテキスト不要）:\n{\"title\": \"日本語タイトル\", \"summary\": \"日本語要約（2〜3文）\"}",
        );

        let raw = self.complete(&prompt, TRANSLATE_MAX_TOKENS).await?;
        let stripped = strip_code_fences(&raw);
        serde_json::from_str(&stripped).map_err(|e| AiError::MalformedResponse(e.to_string()))
    }

    /// Answer a question in Japanese. Returns the raw model text; an
    /// unexpected response shape degrades to an empty string.
    pub async fn ask(&self, title: &str, body: Option<&str>, tags: &[String]) -> Result<String> {
        let mut prompt = format!(
            "あなたは経験豊富なソフトウェアエンジニアです。以下の質問に日本語で実践的に回答してください。\n\n質問: {}\n",
            title
        );
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            prompt.push_str(&format!("詳細: {}\n", body));
        }
        if !tags.is_empty() {
            prompt.push_str(&format!("タグ: {}\n", tags.join(", ")));
        }
        prompt.push_str("\n具体的なコード例や参考情報を交えながら、400字程度で回答してください。");

        self.complete(&prompt, ASK_MAX_TOKENS).await
    }

    /// One user-message completion. Rejects before any network call when no
    /// key is configured.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;
        Ok(extract_text(&json))
    }
}

/// First `content` block of type `text`, or empty when the shape does not
/// match. A shape mismatch is degraded output, not a fault.
fn extract_text(json: &serde_json::Value) -> String {
    json["content"]
        .get(0)
        .filter(|block| block["type"] == "text")
        .and_then(|block| block["text"].as_str())
        .unwrap_or("")
        .to_string()
}

/// Models occasionally wrap "JSON only" answers in markdown fences.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}
