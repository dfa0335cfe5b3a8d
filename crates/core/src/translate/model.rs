//! Local sequence-to-sequence model backend.
//! The model runs in a local inference server; it is checked once at
//! startup and then queried per entry with explicit language codes and
//! generation parameters. Output is reshaped for right-to-left display.

use super::Translator;
use crate::error::TranslationError;
use crate::rtl;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, trace, warn};

/// Decoding parameters passed through to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub num_beams: u32,
    pub do_sample: bool,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            num_beams: 5,
            do_sample: true,
            temperature: 0.7,
        }
    }
}

/// Where the model lives and how to decode with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub generation: GenerationConfig,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            model: "facebook/seamless-m4t-v2-large".to_string(),
            generation: GenerationConfig::default(),
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Health {
    model: String,
    ready: bool,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    src_lang: &'a str,
    tgt_lang: &'a str,
    #[serde(flatten)]
    generation: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    translation: Option<String>,
    error: Option<String>,
}

/// Translator that delegates to a locally served translation model.
pub struct ModelTranslator {
    client: Client,
    config: ModelConfig,
}

impl ModelTranslator {
    /// Connect to the inference server and make sure the model is loaded.
    pub fn connect(config: ModelConfig) -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let translator = Self { client, config };
        let health = translator.health().map_err(|err| {
            TranslationError::Model(format!(
                "cannot reach model server at {}: {err}",
                translator.config.endpoint
            ))
        })?;
        if !health.ready {
            return Err(TranslationError::Model(format!(
                "model {} at {} is not ready",
                health.model, translator.config.endpoint
            )));
        }
        if health.model != translator.config.model {
            warn!(
                "expected model {} but server runs {}",
                translator.config.model, health.model
            );
        }
        info!("model {} loaded", health.model);
        Ok(translator)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn health(&self) -> Result<Health, TranslationError> {
        let resp = self.client.get(self.url("health")).send()?;
        let resp = resp.error_for_status()?;
        Ok(resp.json()?)
    }

    /// Run one generation and return the decoded text.
    fn generate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslationError> {
        let body = GenerateRequest {
            text,
            src_lang: source,
            tgt_lang: target,
            generation: &self.config.generation,
        };
        let resp = self
            .client
            .post(self.url("translate"))
            .json(&body)
            .send()?;
        let resp = resp.error_for_status()?;
        let data: GenerateResponse = resp.json()?;
        match (data.translation, data.error) {
            (_, Some(err)) => Err(TranslationError::Model(err)),
            (Some(translation), None) => Ok(translation),
            (None, None) => Err(TranslationError::Response(
                "missing translation".to_string(),
            )),
        }
    }
}

impl Translator for ModelTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslationError> {
        trace!("model translate {source}->{target} {text:?}");
        let decoded = self.generate(text, source, target)?;
        Ok(rtl::process_arabic_text(&decoded))
    }

    fn name(&self) -> &str {
        "model"
    }
}
