use parley_core::errors::InferenceError;
use parley_store::StoreError;

/// Failure of one chat exchange. Every variant is terminal for the request.
///
/// The message is the underlying error text, unchanged, so the boundary can
/// pass it through to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Missing, blank or oversized input. Nothing was read or called.
    #[error("{0}")]
    InvalidRequest(String),

    /// The model call failed or its reply could not be read. Nothing was written.
    #[error("{0}")]
    InferenceResponse(String),

    #[error("{0}")]
    StorageRead(String),

    /// The reply was produced but could not be persisted.
    #[error("{0}")]
    StorageWrite(String),
}

impl ChatError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InferenceResponse(_) => "inference_response",
            Self::StorageRead(_) => "storage_read",
            Self::StorageWrite(_) => "storage_write",
        }
    }

    pub(crate) fn inference(e: InferenceError) -> Self {
        Self::InferenceResponse(e.to_string())
    }

    pub(crate) fn read(e: StoreError) -> Self {
        Self::StorageRead(e.to_string())
    }

    pub(crate) fn write(e: StoreError) -> Self {
        Self::StorageWrite(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underlying_text_kept_verbatim() {
        let err = ChatError::inference(InferenceError::ServerError { status: 500, body: "boom".into() });
        assert_eq!(err.to_string(), "server error 500: boom");

        let err = ChatError::write(StoreError::Unavailable("table missing".into()));
        assert_eq!(err.to_string(), "store unavailable: table missing");
    }

    #[test]
    fn only_invalid_request_is_client_error() {
        assert!(ChatError::InvalidRequest("x".into()).is_client_error());
        assert!(!ChatError::StorageRead("x".into()).is_client_error());
        assert!(!ChatError::StorageWrite("x".into()).is_client_error());
        assert!(!ChatError::InferenceResponse("x".into()).is_client_error());
    }

    #[test]
    fn error_kinds() {
        assert_eq!(ChatError::StorageWrite(String::new()).error_kind(), "storage_write");
        assert_eq!(ChatError::InferenceResponse(String::new()).error_kind(), "inference_response");
    }
}
