use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use parley_core::errors::InferenceError;
use parley_core::provider::{InferenceProvider, InferenceRequest, InferenceResponse};
use parley_settings::InferenceSettings;

use crate::converter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`BedrockProvider`].
#[derive(Clone, Debug)]
pub struct BedrockConfig {
    pub endpoint: String,
    pub model_id: String,
    pub api_token: Option<SecretString>,
    pub timeout: Duration,
}

impl From<&InferenceSettings> for BedrockConfig {
    fn from(settings: &InferenceSettings) -> Self {
        Self {
            endpoint: settings.endpoint(),
            model_id: settings.model_id.clone(),
            api_token: settings.api_token.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Client for the Bedrock Converse API.
///
/// Authenticates with a bearer API key. The underlying `reqwest::Client`
/// pools connections and is reused for every call.
pub struct BedrockProvider {
    client: Client,
    converse_url: Url,
    model_id: String,
    api_token: Option<SecretString>,
    timeout: Duration,
}

impl BedrockProvider {
    pub fn new(config: BedrockConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::NetworkError(format!("build HTTP client: {e}")))?;

        let converse_url = converse_url(&config.endpoint, &config.model_id)?;

        if config.api_token.is_none() {
            warn!("no inference API token configured; requests will be unauthenticated");
        }

        Ok(Self {
            client,
            converse_url,
            model_id: config.model_id,
            api_token: config.api_token,
            timeout: config.timeout,
        })
    }

    pub fn converse_url(&self) -> &Url {
        &self.converse_url
    }
}

/// `{endpoint}/model/{model_id}/converse`, with the model id as a single
/// escaped path segment (inference-profile ARNs contain `/`).
fn converse_url(endpoint: &str, model_id: &str) -> Result<Url, InferenceError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| InferenceError::InvalidRequest(format!("invalid endpoint {endpoint:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| InferenceError::InvalidRequest(format!("endpoint {endpoint:?} cannot carry a path")))?
        .pop_if_empty()
        .extend(["model", model_id, "converse"]);
    Ok(url)
}

#[async_trait]
impl InferenceProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip(self, request), fields(model = %self.model_id, messages = request.messages.len()))]
    async fn converse(&self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = converter::build_request_body(request);

        let mut req = self
            .client
            .post(self.converse_url.clone())
            .header("accept", "application/json")
            .json(&body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token.expose_secret());
        }

        let started = Instant::now();
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout)
            } else {
                InferenceError::NetworkError(e.to_string())
            }
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout)
            } else {
                InferenceError::NetworkError(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(InferenceError::from_status(status.as_u16(), text));
        }

        let response = converter::parse_response(&text)?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            output_tokens = response.usage.as_ref().map(|u| u.output_tokens),
            "converse completed"
        );
        Ok(response)
    }
}
