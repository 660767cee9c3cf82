pub mod bedrock;
pub mod converter;

pub mod mock;

pub use bedrock::{BedrockConfig, BedrockProvider};
pub use mock::{MockProvider, MockResponse};
