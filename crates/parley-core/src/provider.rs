use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::InferenceError;
use crate::messages::Turn;

/// Generation parameters sent with every inference call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 300,
            temperature: 0.5,
        }
    }
}

/// Everything the inference service needs for one call.
#[derive(Clone, Debug)]
pub struct InferenceRequest {
    pub system: Vec<String>,
    pub messages: Vec<Turn>,
    pub options: GenerationOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InferenceResponse {
    pub text: String,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl InferenceResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stop_reason: Some("end_turn".into()),
            usage: None,
        }
    }
}

/// Trait implemented by each inference backend.
///
/// One call, no streaming, no retry. Implementations hold only
/// connection-level state and are shared across requests.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn converse(&self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError>;
}
