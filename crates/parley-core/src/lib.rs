pub mod errors;
pub mod ids;
pub mod messages;
pub mod provider;
pub mod session;

pub use errors::InferenceError;
pub use ids::{RequestId, SessionId};
pub use messages::{ContentBlock, Role, Turn};
pub use provider::{GenerationOptions, InferenceProvider, InferenceRequest, InferenceResponse, TokenUsage};
pub use session::SessionRecord;
