//! Blocking client for an OpenAI-style `/completions` endpoint.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::DigestError;

/// Anything that turns a prompt into text within a token budget.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub n: u32,
    pub stop: Option<Vec<String>>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

impl CompletionResponse {
    pub fn into_text(self) -> Result<String> {
        let first = self
            .choices
            .into_iter()
            .next()
            .ok_or(DigestError::EmptyCompletion)?;
        Ok(first.text.trim().to_string())
    }
}

/// Holds the API key explicitly; built once and shared by every call.
pub struct CompletionClient {
    api_key: String,
    endpoint: Url,
    model: String,
    temperature: f32,
    http: reqwest::blocking::Client,
}

impl CompletionClient {
    pub fn new(api_key: String, cfg: &Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(Self {
            api_key,
            endpoint: completions_url(&cfg.api_base)?,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            http,
        })
    }

    pub fn request<'a>(&'a self, prompt: &'a str, max_tokens: u32) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
            n: 1,
            stop: None,
            temperature: self.temperature,
        }
    }
}

impl TextGenerator for CompletionClient {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        log::debug!(
            "sending completion request ({} prompt chars, max_tokens {})",
            prompt.len(),
            max_tokens
        );
        let api_key = &self.api_key;
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&self.request(prompt, max_tokens))
            .send()
            .map_err(|e| anyhow!("completion request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DigestError::Generation {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let text = resp
            .json::<CompletionResponse>()
            .map_err(|e| anyhow!("failed to parse completion response: {e}"))?
            .into_text()?;
        log::debug!("completion returned {} chars", text.len());
        Ok(text)
    }
}

fn completions_url(api_base: &str) -> Result<Url> {
    let base = format!("{}/", api_base.trim_end_matches('/'));
    Ok(Url::parse(&base)?.join("completions")?)
}
