use std::time::Duration;

use async_trait::async_trait;
use common::{error::AppError, utils::config::BackendConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::GenerationBackend;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sampling and hardware knobs forwarded verbatim as `options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_thread: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_vram: Option<bool>,
}

impl GenerateOptions {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Client for an Ollama-style `/api/generate` endpoint.
pub struct OllamaBackend {
    name: String,
    client: Client,
    url: String,
    model: String,
    json_format: bool,
    options: GenerateOptions,
    timeout: Option<Duration>,
}

impl OllamaBackend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self {
            name: config.name.clone(),
            client,
            url: config.url.clone(),
            model: config.model.clone(),
            json_format: config.json_format,
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.num_predict,
                num_thread: config.num_thread,
                num_gpu: config.num_gpu,
                low_vram: config.low_vram,
            },
            timeout: config.timeout(),
        })
    }

    fn unreachable(&self, reason: impl Into<String>) -> AppError {
        AppError::BackendUnreachable {
            backend: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        #[derive(Serialize)]
        struct GenerateReq<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            format: Option<&'static str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            options: Option<&'a GenerateOptions>,
        }

        #[derive(Deserialize)]
        struct GenerateResp {
            response: String,
        }

        debug!(backend = %self.name, url = %self.url, model = %self.model, "Calling generate endpoint");

        let response = self
            .client
            .post(&self.url)
            .json(&GenerateReq {
                model: &self.model,
                prompt,
                stream: false,
                format: self.json_format.then_some("json"),
                options: (!self.options.is_empty()).then_some(&self.options),
            })
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.unreachable(format!(
                "returned {status}: {}",
                normalize_err_body(&body)
            )));
        }

        let envelope = response.json::<GenerateResp>().await.map_err(|e| {
            AppError::BackendMalformedResponse {
                backend: self.name.clone(),
                reason: format!("failed to decode generate response: {e}"),
            }
        })?;

        Ok(envelope.response.trim().to_string())
    }
}

fn normalize_err_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }

    trimmed.to_string()
}
