//! Natural-language to SQL translation.
//!
//! The translator renders a fixed-shape, schema-aware prompt, makes exactly
//! one deterministic completion call through the [`LanguageModel`] boundary,
//! and strips code-fence markup from the response. It never validates the
//! SQL it returns; validation happens by executing it downstream.

use crate::error::{PrismError, Result};
use crate::types::TableSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SYSTEM_PROMPT: &str = "You are a SQL expert. Return only SQL queries.";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Single-shot text completion boundary.
///
/// One blocking round trip per call; no retries, no streaming. A hang in the
/// service stalls the caller, so callers wanting bounded latency must wrap
/// this with their own deadline.
pub trait LanguageModel {
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Blocking client for any OpenAI-compatible chat completion endpoint.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Fails fast when no credential is configured; no network attempt is
    /// ever made without one.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PrismError::Translation(
                "no API key configured".to_string(),
            ));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| PrismError::Http(e.to_string()))?;
        Ok(Self {
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            http,
        })
    }
}

impl LanguageModel for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| PrismError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrismError::Http(format!(
                "language model service returned {status}"
            )));
        }

        let payload: ChatResponse = response
            .json()
            .map_err(|e| PrismError::Http(e.to_string()))?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

pub struct Translator {
    model: Box<dyn LanguageModel>,
}

impl Translator {
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Turn a question into an executable SQL string for one table.
    pub fn translate(
        &self,
        question: &str,
        table: &str,
        schema: &TableSchema,
    ) -> Result<String> {
        let prompt = build_prompt(question, table, schema);
        debug!(table, prompt_len = prompt.len(), "requesting translation");

        let raw = self
            .model
            .complete(SYSTEM_PROMPT, &prompt)
            .map_err(|e| match e {
                PrismError::Translation(_) => e,
                other => PrismError::Translation(other.to_string()),
            })?;

        let sql = strip_fences(&raw);
        if sql.is_empty() {
            return Err(PrismError::Translation(
                "language model returned empty content".to_string(),
            ));
        }
        debug!(sql = %sql, "translation complete");
        Ok(sql)
    }
}

pub fn build_prompt(question: &str, table: &str, schema: &TableSchema) -> String {
    format!(
        "Convert this question to SQL.\n\n\
         Table: {table}\n\
         Columns: {columns}\n\
         Question: {question}\n\n\
         Return ONLY the SQL query. No explanations. Use SQLite syntax.",
        columns = schema.column_listing(),
    )
}

static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:sql)?\s*(.*?)```").unwrap());

/// Strip markdown fences and language tags, then trim.
fn strip_fences(raw: &str) -> String {
    let text = raw.trim();
    let text = match FENCE_REGEX.captures(text) {
        Some(captures) => captures.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    };
    text.replace("```sql", "")
        .replace("```", "")
        .trim()
        .to_string()
}
