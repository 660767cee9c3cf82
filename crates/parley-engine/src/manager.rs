use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use parley_core::ids::SessionId;
use parley_core::messages::Turn;
use parley_core::provider::{InferenceProvider, InferenceRequest};
use parley_core::session::SessionRecord;
use parley_store::SessionStore;

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::window::truncate_to_window;

/// Successful outcome of one exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
}

/// Runs one conversational turn: load the session, call the model with the
/// windowed history, persist the updated history.
///
/// Holds no per-session state between calls. Concurrent requests for the
/// same session are not coordinated; the last write wins.
pub struct TurnManager {
    provider: Arc<dyn InferenceProvider>,
    store: Arc<dyn SessionStore>,
    config: ChatConfig,
}

impl TurnManager {
    pub fn new(provider: Arc<dyn InferenceProvider>, store: Arc<dyn SessionStore>, config: ChatConfig) -> Self {
        Self { provider, store, config }
    }

    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn chat(&self, session_id: &str, user_text: &str) -> Result<ChatReply, ChatError> {
        let id = SessionId::from_raw(session_id);
        self.validate(&id, user_text)?;

        let mut history = match self.store.get(&id).await {
            Ok(Some(record)) => record.history,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "session read failed");
                return Err(ChatError::read(e));
            }
        };
        let stored_len = history.len();

        let dropped = truncate_to_window(&mut history, self.config.window_size);
        if dropped > 0 {
            debug!(dropped, "stored history exceeded window");
        }
        history.push(Turn::user(user_text));

        let request = InferenceRequest {
            system: vec![self.config.system_prompt.clone()],
            messages: history.clone(),
            options: self.config.generation.clone(),
        };
        let response = match self.provider.converse(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.error_kind(),
                    retryable = e.is_retryable(),
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    "inference failed"
                );
                return Err(ChatError::inference(e));
            }
        };

        history.push(Turn::assistant(response.text.clone()));
        truncate_to_window(&mut history, self.config.window_size);

        let record = SessionRecord::now(id, history);
        if let Err(e) = self.store.put(&record).await {
            warn!(error = %e, "session write failed");
            return Err(ChatError::write(e));
        }

        info!(
            stored_len,
            history_len = record.history.len(),
            reply_chars = response.text.chars().count(),
            "turn complete"
        );
        Ok(ChatReply {
            reply: response.text,
            session_id: session_id.to_owned(),
        })
    }

    fn validate(&self, session_id: &SessionId, user_text: &str) -> Result<(), ChatError> {
        if session_id.is_blank() || user_text.trim().is_empty() {
            return Err(ChatError::InvalidRequest("session_id and message are required".into()));
        }
        if session_id.as_str().chars().count() > self.config.max_session_id_chars {
            return Err(ChatError::InvalidRequest(format!(
                "session_id exceeds {} characters",
                self.config.max_session_id_chars
            )));
        }
        if user_text.chars().count() > self.config.max_message_chars {
            return Err(ChatError::InvalidRequest(format!(
                "message exceeds {} characters",
                self.config.max_message_chars
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::errors::InferenceError;
    use parley_core::messages::Role;
    use parley_llm::{MockProvider, MockResponse};
    use parley_store::MockSessionStore;

    fn manager(provider: &Arc<MockProvider>, store: &Arc<MockSessionStore>) -> TurnManager {
        TurnManager::new(provider.clone(), store.clone(), ChatConfig::default())
    }

    fn alternating(pairs: usize) -> Vec<Turn> {
        (0..pairs)
            .flat_map(|i| [Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}"))])
            .collect()
    }

    #[tokio::test]
    async fn first_turn_creates_session() {
        let provider = Arc::new(MockProvider::always("Hello"));
        let store = Arc::new(MockSessionStore::new());

        let reply = manager(&provider, &store).chat("s1", "Hi").await.unwrap();
        assert_eq!(reply, ChatReply { reply: "Hello".into(), session_id: "s1".into() });

        let record = store.peek("s1").await.unwrap();
        assert_eq!(record.history, vec![Turn::user("Hi"), Turn::assistant("Hello")]);
        assert!(record.last_updated > 0);

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages, vec![Turn::user("Hi")]);
    }

    #[tokio::test]
    async fn request_carries_prompt_and_options() {
        let provider = Arc::new(MockProvider::always("ok"));
        let store = Arc::new(MockSessionStore::new());
        manager(&provider, &store).chat("s1", "Hi").await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.system, vec![ChatConfig::default().system_prompt]);
        assert_eq!(request.options.max_tokens, 300);
        assert!((request.options.temperature - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn second_turn_sends_prior_history() {
        let provider = Arc::new(MockProvider::new(vec![MockResponse::text("Hello"), MockResponse::text("Fine")]));
        let store = Arc::new(MockSessionStore::new());
        let manager = manager(&provider, &store);

        manager.chat("s1", "Hi").await.unwrap();
        manager.chat("s1", "How are you?").await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(
            request.messages,
            vec![Turn::user("Hi"), Turn::assistant("Hello"), Turn::user("How are you?")]
        );
        assert_eq!(store.peek("s1").await.unwrap().history.len(), 4);
    }

    #[tokio::test]
    async fn full_window_drops_oldest_pair() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let seeded = alternating(6);
        store.seed(SessionRecord::now(SessionId::from_raw("s1"), seeded.clone())).await;

        manager(&provider, &store).chat("s1", "next").await.unwrap();

        // Model saw all 12 stored turns plus the new one.
        assert_eq!(provider.last_request().unwrap().messages.len(), 13);

        let history = store.peek("s1").await.unwrap().history;
        assert_eq!(history.len(), 12);
        assert_eq!(&history[..10], &seeded[2..]);
        assert_eq!(history[10], Turn::user("next"));
        assert_eq!(history[11], Turn::assistant("R"));
    }

    #[tokio::test]
    async fn history_grows_then_caps_at_window() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let manager = manager(&provider, &store);

        for n in 0..10 {
            manager.chat("s1", &format!("m{n}")).await.unwrap();
            let len = store.peek("s1").await.unwrap().history.len();
            assert_eq!(len, std::cmp::min(2 * (n + 1), 12));
        }
        let history = store.peek("s1").await.unwrap().history;
        assert_eq!(history[0], Turn::user("m4"));
        assert_eq!(history[11], Turn::assistant("R"));
    }

    #[tokio::test]
    async fn oversized_stored_history_is_truncated_before_the_call() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let seeded = alternating(10);
        store.seed(SessionRecord::now(SessionId::from_raw("s1"), seeded.clone())).await;

        manager(&provider, &store).chat("s1", "next").await.unwrap();

        let sent = provider.last_request().unwrap().messages;
        assert_eq!(sent.len(), 13);
        assert_eq!(&sent[..12], &seeded[8..]);

        let history = store.peek("s1").await.unwrap().history;
        assert_eq!(history.len(), 12);
        assert_eq!(&history[..10], &seeded[10..]);
    }

    #[tokio::test]
    async fn odd_length_history_keeps_roles_as_stored() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let mut seeded = alternating(6);
        seeded.push(Turn::user("dangling"));
        store.seed(SessionRecord::now(SessionId::from_raw("s1"), seeded)).await;

        manager(&provider, &store).chat("s1", "next").await.unwrap();

        let sent = provider.last_request().unwrap().messages;
        assert_eq!(sent[0].role, Role::Assistant);
        assert_eq!(sent[11], Turn::user("dangling"));
        assert_eq!(sent[12], Turn::user("next"));
    }

    #[tokio::test]
    async fn invalid_input_touches_nothing() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let manager = manager(&provider, &store);

        for (sid, msg) in [("", "Hi"), ("s1", ""), ("   ", "Hi"), ("s1", "\n\t ")] {
            let err = manager.chat(sid, msg).await.unwrap_err();
            assert!(matches!(err, ChatError::InvalidRequest(_)), "{sid:?} {msg:?}");
            assert_eq!(err.to_string(), "session_id and message are required");
        }
        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.get_count(), 0);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn oversized_input_rejected() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let manager = manager(&provider, &store);

        let long_id = "x".repeat(257);
        let err = manager.chat(&long_id, "Hi").await.unwrap_err();
        assert_eq!(err.to_string(), "session_id exceeds 256 characters");

        let long_msg = "y".repeat(8_001);
        let err = manager.chat("s1", &long_msg).await.unwrap_err();
        assert_eq!(err.to_string(), "message exceeds 8000 characters");

        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.get_count(), 0);
    }

    #[tokio::test]
    async fn message_stored_untrimmed() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        manager(&provider, &store).chat("s1", "  Hi  ").await.unwrap();

        let history = store.peek("s1").await.unwrap().history;
        assert_eq!(history[0], Turn::user("  Hi  "));
    }

    #[tokio::test]
    async fn inference_failure_writes_nothing() {
        let provider = Arc::new(MockProvider::new(vec![MockResponse::Error(InferenceError::Throttled(
            "slow down".into(),
        ))]));
        let store = Arc::new(MockSessionStore::new());
        store.seed(SessionRecord::now(SessionId::from_raw("s1"), alternating(1))).await;

        let err = manager(&provider, &store).chat("s1", "Hi").await.unwrap_err();
        assert!(matches!(err, ChatError::InferenceResponse(_)));
        assert_eq!(err.to_string(), "throttled: slow down");
        assert_eq!(store.put_count(), 0);
        assert_eq!(store.peek("s1").await.unwrap().history, alternating(1));
    }

    #[tokio::test]
    async fn read_failure_skips_inference() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        store.fail_reads(true);

        let err = manager(&provider, &store).chat("s1", "Hi").await.unwrap_err();
        assert!(matches!(err, ChatError::StorageRead(_)));
        assert_eq!(err.to_string(), "store unavailable: injected read failure");
        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn write_failure_reported_after_inference() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        store.fail_writes(true);

        let err = manager(&provider, &store).chat("s1", "Hi").await.unwrap_err();
        assert!(matches!(err, ChatError::StorageWrite(_)));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(store.put_count(), 1);
        assert!(store.peek("s1").await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let manager = manager(&provider, &store);

        manager.chat("a", "one").await.unwrap();
        manager.chat("b", "two").await.unwrap();
        manager.chat("a", "three").await.unwrap();

        assert_eq!(store.peek("a").await.unwrap().history.len(), 4);
        assert_eq!(store.peek("b").await.unwrap().history, vec![Turn::user("two"), Turn::assistant("R")]);
    }

    #[tokio::test]
    async fn custom_window_size() {
        let provider = Arc::new(MockProvider::always("R"));
        let store = Arc::new(MockSessionStore::new());
        let config = ChatConfig { window_size: 4, ..ChatConfig::default() };
        let manager = TurnManager::new(provider.clone(), store.clone(), config);

        for n in 0..3 {
            manager.chat("s1", &format!("m{n}")).await.unwrap();
        }
        let history = store.peek("s1").await.unwrap().history;
        assert_eq!(history, vec![Turn::user("m1"), Turn::assistant("R"), Turn::user("m2"), Turn::assistant("R")]);
    }
}
