//! Web translation service backend.
//! Text is sent whole to the public Google Translate endpoint with the
//! source language auto-detected. Embedded markup travels as plain text.

use super::Translator;
use crate::error::TranslationError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// Texts of this many characters or more are rejected by the service.
pub const MAX_CHARS: usize = 5000;

/// Connection settings for [`WebTranslator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Translator backed by the online translation service.
pub struct WebTranslator {
    client: Client,
    config: WebConfig,
}

impl WebTranslator {
    pub fn new(config: WebConfig) -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Send the text to the service and return the raw JSON answer.
    fn request(&self, text: &str, source: &str, target: &str) -> Result<Value, TranslationError> {
        let url = format!(
            "{}/translate_a/single",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .get(url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?;
        let resp = resp.error_for_status()?;
        Ok(resp.json()?)
    }
}

/// Nothing to translate when there are no letters at all.
fn needs_translation(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// The answer is `[[[translated, original, ...], ...], _, detected_lang, ...]`;
/// the translation is the concatenation of all sentence chunks.
fn parse_response(value: &Value) -> Result<String, TranslationError> {
    let chunks = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Response(format!("no sentences in {value}")))?;
    if let Some(lang) = value.get(2).and_then(Value::as_str) {
        debug!("detected source language {lang}");
    }
    Ok(chunks
        .iter()
        .filter_map(|c| c.get(0).and_then(Value::as_str))
        .collect())
}

impl Translator for WebTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslationError> {
        let text = text.trim();
        if source == target || !needs_translation(text) {
            trace!("skipping translation of {text:?}");
            return Ok(text.to_string());
        }
        let len = text.chars().count();
        if len >= MAX_CHARS {
            return Err(TranslationError::InvalidLength(len));
        }
        let value = self.request(text, source, target)?;
        parse_response(&value)
    }

    fn name(&self) -> &str {
        "web"
    }
}
