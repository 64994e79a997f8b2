use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use common::{error::AppError, utils::config::BackendConfig};
use tracing::debug;

use super::backend::GenerationBackend;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate limits and server errors fail the attempt at once so the next
/// backend gets its turn; the client would otherwise retry for minutes.
fn no_retry_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..ExponentialBackoff::default()
    }
}

/// Client for an OpenAI-compatible chat completions API such as Groq.
pub struct ChatCompletionsBackend {
    name: String,
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    json_format: bool,
    timeout: Option<Duration>,
}

impl ChatCompletionsBackend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, AppError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            AppError::Validation(format!("backend '{}' has no API key", config.name))
        })?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(config.url.trim_end_matches('/'))
                .with_api_key(api_key),
        )
        .with_http_client(http_client)
        .with_backoff(no_retry_backoff());

        Ok(Self {
            name: config.name.clone(),
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.num_predict,
            json_format: config.json_format,
            timeout: config.timeout(),
        })
    }

    fn create_chat_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages([ChatCompletionRequestUserMessage::from(prompt.to_string()).into()]);

        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if self.json_format {
            args.response_format(ResponseFormat::JsonObject);
        }

        args.build()
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let request = self.create_chat_request(prompt)?;

        debug!(backend = %self.name, model = %self.model, "Requesting chat completion");

        let response = self.client.chat().create(request).await.map_err(|e| {
            AppError::BackendUnreachable {
                backend: self.name.clone(),
                reason: e.to_string(),
            }
        })?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AppError::BackendMalformedResponse {
                backend: self.name.clone(),
                reason: "No content found in chat completion".into(),
            })
    }
}
