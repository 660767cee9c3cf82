pub mod config;
pub mod error;
pub mod manager;
pub mod window;

pub use config::ChatConfig;
pub use error::ChatError;
pub use manager::{ChatReply, TurnManager};
