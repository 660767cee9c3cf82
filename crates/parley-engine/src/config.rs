use parley_core::provider::GenerationOptions;

pub const DEFAULT_WINDOW_SIZE: usize = 12;
pub const DEFAULT_MAX_SESSION_ID_CHARS: usize = 256;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 8_000;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced technical interviewer running a \
mock interview. Ask one question at a time and wait for the candidate's answer. After each \
answer, give brief, specific feedback and then ask a natural follow-up or move to the next \
topic. Keep replies concise and conversational.";

/// Fixed parameters of a chat exchange.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Maximum number of turns kept in a session's history.
    pub window_size: usize,
    pub system_prompt: String,
    pub generation: GenerationOptions,
    pub max_session_id_chars: usize,
    pub max_message_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
            max_session_id_chars: DEFAULT_MAX_SESSION_ID_CHARS,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}
