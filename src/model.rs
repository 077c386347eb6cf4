use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::credential::Credential;
use crate::media::ImageInput;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model response was blocked: {0}")]
    Blocked(String),

    #[error("model returned no text content")]
    EmptyResponse,

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("invalid model configuration: {0}")]
    Config(String),
}

/// One generation call: a role's instructions, the wrapped prompt, and every image.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub instructions: &'a [String],
    pub prompt: &'a str,
    pub images: &'a [ImageInput],
    pub web_search: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub content: String,
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError>;
}

/// Builds a backend bound to one credential.
pub trait ModelConnector: Send + Sync {
    fn connect(&self, credential: &Credential) -> Result<Arc<dyn ModelBackend>, ModelError>;
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl ModelSettings {
    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            api_base_url: cfg.api_base_url.clone(),
            request_timeout: cfg.request_timeout(),
        }
    }
}

pub fn validate_model_name(model_name: &str) -> Result<(), ModelError> {
    let trimmed = model_name.trim();
    if trimmed.starts_with("gemini")
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_'))
    {
        return Ok(());
    }

    Err(ModelError::Config(format!(
        "model '{}' is not a Gemini model id",
        model_name
    )))
}

pub fn validate_api_key(credential: &Credential) -> Result<(), ModelError> {
    let key = credential.expose();
    if key
        .chars()
        .any(|ch| ch.is_whitespace() || ch.is_control() || !ch.is_ascii())
    {
        return Err(ModelError::Config(
            "API key contains whitespace or non-ASCII characters".to_string(),
        ));
    }
    Ok(())
}

pub struct GeminiModel {
    client: Client,
    api_key: Credential,
    model: String,
    endpoint: String,
}

impl GeminiModel {
    pub fn new(credential: &Credential, settings: &ModelSettings) -> Result<Self, ModelError> {
        validate_model_name(&settings.model)?;
        validate_api_key(credential)?;

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            settings.api_base_url.trim_end_matches('/'),
            settings.model.trim()
        );

        Ok(Self {
            client,
            api_key: credential.clone(),
            model: settings.model.trim().to_string(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelBackend for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        let body = build_generate_body(&request);
        tracing::debug!(
            model = %self.model,
            images = request.images.len(),
            web_search = request.web_search,
            prompt_chars = request.prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &text));
        }

        let value = serde_json::from_str::<Value>(&text)
            .map_err(|err| ModelError::Malformed(err.to_string()))?;
        let content = extract_reply_text(&value)?;
        Ok(ModelReply { content })
    }
}

pub fn build_generate_body(request: &ModelRequest<'_>) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    for image in request.images {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": BASE64.encode(&image.data),
            }
        }));
    }

    let mut body = json!({
        "contents": [{ "role": "user", "parts": parts }],
    });

    if !request.instructions.is_empty() {
        body["system_instruction"] = json!({
            "parts": [{ "text": request.instructions.join("\n") }]
        });
    }
    if request.web_search {
        body["tools"] = json!([{ "google_search": {} }]);
    }

    body
}

pub fn extract_reply_text(response: &Value) -> Result<String, ModelError> {
    let Some(candidate) = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        if let Some(reason) = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(ModelError::Blocked(reason.to_string()));
        }
        return Err(ModelError::EmptyResponse);
    };

    let text = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<&str>>()
                .join("")
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match candidate.get("finishReason").and_then(Value::as_str) {
        Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
            Err(ModelError::Blocked(reason.to_string()))
        }
        _ => Err(ModelError::EmptyResponse),
    }
}

pub fn parse_api_error(status: u16, body: &str) -> ModelError {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(error) = value.get("error").and_then(Value::as_object)
    {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let message = match error.get("status").and_then(Value::as_str) {
            Some(kind) => format!("{kind}: {message}"),
            None => message.to_string(),
        };
        return ModelError::Api { status, message };
    }

    let snippet = body.chars().take(200).collect::<String>();
    ModelError::Api {
        status,
        message: if snippet.trim().is_empty() {
            "empty error body".to_string()
        } else {
            format!("unexpected response: {snippet}")
        },
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConnector {
    settings: ModelSettings,
}

impl GeminiConnector {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }
}

impl ModelConnector for GeminiConnector {
    fn connect(&self, credential: &Credential) -> Result<Arc<dyn ModelBackend>, ModelError> {
        Ok(Arc::new(GeminiModel::new(credential, &self.settings)?))
    }
}
