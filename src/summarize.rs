//! AI summarization of the seed page
//!
//! Invoked at most once per session, after mirroring completes. The
//! summarizer POSTs a generateContent-style JSON body to the configured
//! endpoint (Gemini's API shape). A missing API key disables summarization
//! with a warning; any failure is downgraded by the session so the summary
//! never affects crawl state.

use crate::config::SummarizerSection;
use crate::MirrorError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for one session's summarization call
pub struct Summarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    max_chars: usize,
}

impl Summarizer {
    /// Builds a summarizer from config, reading the API key from the
    /// configured environment variable
    ///
    /// Returns None (with a warning) when the key is absent: summarization is
    /// unavailable rather than an error.
    pub fn from_config(config: &SummarizerSection) -> Option<Self> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!(
                    "Summarizer configured but {} is not set; skipping summarization",
                    config.api_key_env
                );
                return None;
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .ok()?;

        Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            max_chars: config.max_chars,
        })
    }

    /// Summarizes the given text, truncated to the configured length
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The summary text
    /// * `Err(MirrorError::Summarize)` - HTTP failure or unexpected payload
    pub async fn summarize(&self, text: &str) -> Result<String, MirrorError> {
        let content = truncate_chars(text, self.max_chars);
        let body = json!({
            "contents": [{
                "parts": [{
                    "text": format!("Summarize the following content: {}", content)
                }]
            }]
        });

        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| MirrorError::Summarize(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Summarize(format!("HTTP {}", status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| MirrorError::Summarize(e.to_string()))?;

        extract_summary(&payload)
            .ok_or_else(|| MirrorError::Summarize("unexpected response shape".to_string()))
    }
}

/// Pulls the summary text out of a generateContent response
fn extract_summary(payload: &Value) -> Option<String> {
    let text = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    Some(text.trim().to_string()).filter(|s| !s.is_empty())
}

/// Truncates at a char boundary so multi-byte content cannot panic
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
