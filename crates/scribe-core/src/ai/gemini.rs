use anyhow::{Context, Result};
use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::config::CoreConfig;
use crate::constants::{
    EMPTY_GENERATION, FALLBACK_APOLOGY, FALLBACK_QUOTES, QUOTE_SYSTEM_PROMPT,
};

/// Client for the generative text API with a deterministic fallback policy.
///
/// Exactly one request per call, no retry: any transport or status failure is
/// absorbed by the fallback so the caller (and the user) never sees an error
/// state.
pub struct GenerativeClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GenerativeClient {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            endpoint: config.generative_endpoint.clone(),
            api_key: config.generative_api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Generate text for a prompt. Infallible: on any failure the fallback
    /// policy produces a response indistinguishable from a real one.
    pub async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> String {
        match self.try_generate(prompt, system_instruction).await {
            Ok(text) => text,
            Err(e) => {
                warn!("generative request failed, using fallback: {e:#}");
                fallback_response(prompt, system_instruction)
            }
        }
    }

    /// Generate a quote about a topic, for the explorer flow.
    pub async fn generate_quote(&self, topic: &str) -> String {
        self.generate(
            &format!("Write a quote about: {topic}"),
            Some(QUOTE_SYSTEM_PROMPT),
        )
        .await
    }

    async fn try_generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let mut body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if let Some(instruction) = system_instruction {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": instruction }] });
        }

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("failed to send generateContent request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("generative API error ({}): {}", status, error_text);
        }

        let response_json: Value = response
            .json()
            .await
            .context("failed to parse generateContent response")?;

        let text = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| EMPTY_GENERATION.to_string());
        Ok(text)
    }
}

/// Fallback policy: quote-shaped requests get a canned quote, everything else
/// gets the fixed apology line.
fn fallback_response(prompt: &str, system_instruction: Option<&str>) -> String {
    let is_quote_request = prompt.to_lowercase().contains("quote")
        || system_instruction
            .map(|s| s.to_lowercase().contains("quote"))
            .unwrap_or(false);

    if is_quote_request {
        let pick = rand::thread_rng().gen_range(0..FALLBACK_QUOTES.len());
        FALLBACK_QUOTES[pick].to_string()
    } else {
        FALLBACK_APOLOGY.to_string()
    }
}
