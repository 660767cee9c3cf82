use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use parley_core::errors::InferenceError;
use parley_core::provider::{InferenceProvider, InferenceRequest, InferenceResponse};

/// Pre-programmed responses for deterministic testing without API calls.
pub enum MockResponse {
    /// Reply with this text.
    Text(String),
    /// Fail the call.
    Error(InferenceError),
    /// Wait a duration, then yield the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Convenience: wrap any response with a delay.
    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock provider that returns pre-programmed responses in sequence and
/// records every request it receives.
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: Option<String>,
    requests: Mutex<Vec<InferenceRequest>>,
    call_count: AtomicUsize,
}

impl MockProvider {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// A provider that answers every call with the same text.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of all requests received so far.
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn converse(&self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let next = self.responses.lock().pop_front();
        let mut response = match (next, &self.fallback) {
            (Some(r), _) => r,
            (None, Some(text)) => MockResponse::Text(text.clone()),
            (None, None) => {
                return Err(InferenceError::InvalidRequest(format!(
                    "MockProvider: no response configured for call {idx}"
                )))
            }
        };

        loop {
            match response {
                MockResponse::Text(text) => return Ok(InferenceResponse::text(text)),
                MockResponse::Error(e) => return Err(e),
                MockResponse::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
            }
        }
    }
}
