//! Mentor Chat Session
//!
//! A session is bound once to the complete, untruncated project text and keeps
//! its own append-only history. `send` is the only mutator and takes `&mut self`,
//! so at most one reply can be in flight per session.
//!
//! A failed send leaves the user message in history without a model reply; the
//! session stays usable.

use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::context::full_context;
use crate::ai::provider::{ChatRequest, SharedProvider};
use crate::ai::timeout::with_timeout;
use crate::constants::{chat as chat_constants, network as net_constants};
use crate::types::utils::preview;
use crate::types::{ChatMessage, ErrorClassifier, MentorError, ProjectFile, Result, StageError};

pub struct ChatSession {
    id: Uuid,
    provider: SharedProvider,
    system_instruction: String,
    history: Vec<ChatMessage>,
    timeout: Duration,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("provider", &self.provider.name())
            .field("context_chars", &self.system_instruction.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl ChatSession {
    /// Bind a new session to the given files
    pub fn open(files: &[ProjectFile], provider: SharedProvider) -> Self {
        let system_instruction = format!("{}{}", chat_constants::SYSTEM_PREFIX, full_context(files));
        let id = Uuid::new_v4();
        debug!(
            session = %id,
            files = files.len(),
            context_chars = system_instruction.len(),
            "Chat session opened"
        );

        Self {
            id,
            provider,
            system_instruction,
            history: Vec::new(),
            timeout: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send one user message and return the model's reply text.
    ///
    /// The reply may be empty; callers decide how to present that.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(MentorError::EmptyMessage);
        }

        self.history.push(ChatMessage::user(text));

        let request = ChatRequest {
            system: &self.system_instruction,
            messages: &self.history,
        };
        let outcome = with_timeout(self.timeout, self.provider.converse(request), "chat reply").await;

        match outcome {
            Ok(response) => {
                debug!(
                    session = %self.id,
                    turns = self.history.len(),
                    tokens = response.usage.total(),
                    reply = %preview(&response.content, 80),
                    "Chat reply received"
                );
                self.history.push(ChatMessage::model(response.content.clone()));
                Ok(response.content)
            }
            Err(err) => {
                let llm = ErrorClassifier::classify_mentor_error(&err, self.provider.name());
                warn!(session = %self.id, "Chat reply failed: {}", llm);
                Err(MentorError::Chat(StageError::ModelCallFailure(llm)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::MockProvider;
    use crate::types::{ChatRole, ErrorCategory};
    use std::sync::Arc;

    fn project_a() -> Vec<ProjectFile> {
        vec![ProjectFile::new("alpha/main.py", "print('alpha secret')")]
    }

    fn project_b() -> Vec<ProjectFile> {
        vec![ProjectFile::new("beta/lib.rs", "fn beta() {}")]
    }

    #[test]
    fn test_open_binds_full_context() {
        let big = "z".repeat(10_000);
        let files = vec![ProjectFile::new("a.js", big.clone()), ProjectFile::new("b.js", "b")];
        let session = ChatSession::open(&files, Arc::new(MockProvider::new()));

        assert_eq!(
            session.system_instruction(),
            format!(
                "You are an expert Software Mentor. Context:\nPath: a.js\nContent:\n{}\n\nPath: b.js\nContent:\nb",
                big
            )
        );
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_successful_sends_append_pairs() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok("Use a module pattern.");
        mock.push_ok("Move the key server-side.");
        let mut session = ChatSession::open(&project_a(), mock.clone());

        assert_eq!(session.send("How do I refactor?").await.unwrap(), "Use a module pattern.");
        session.send("And the API key?").await.unwrap();

        let history = session.history();
        assert_eq!(history.len(), 4);
        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Model, ChatRole::User, ChatRole::Model]
        );

        // Each call carries the whole history up to and including the new message
        let calls = mock.chat_requests();
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[1].1.len(), 3);
        assert_eq!(calls[1].1[2].text, "And the API key?");
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_message_only() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok("first");
        mock.push_err(ErrorCategory::Network, "connection reset");
        mock.push_ok("recovered");
        let mut session = ChatSession::open(&project_a(), mock.clone());

        session.send("one").await.unwrap();
        let err = session.send("two").await.unwrap_err();
        assert!(matches!(
            err,
            MentorError::Chat(StageError::ModelCallFailure(ref llm)) if llm.category == ErrorCategory::Network
        ));
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[2].role, ChatRole::User);

        // Session survives the failure
        assert_eq!(session.send("two again").await.unwrap(), "recovered");
        assert_eq!(session.history().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_call() {
        let mock = Arc::new(MockProvider::new());
        let mut session = ChatSession::open(&project_a(), mock.clone());

        assert!(matches!(session.send("   ").await, Err(MentorError::EmptyMessage)));
        assert!(session.history().is_empty());
        assert_eq!(mock.converse_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_reply_is_stored() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok("");
        let mut session = ChatSession::open(&project_a(), mock);

        assert_eq!(session.send("hello").await.unwrap(), "");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].text, "");
    }

    #[tokio::test]
    async fn test_sessions_do_not_leak_context() {
        let mock_a = Arc::new(MockProvider::new());
        let mock_b = Arc::new(MockProvider::new());
        mock_a.push_ok("a");
        mock_b.push_ok("b");

        let mut session_a = ChatSession::open(&project_a(), mock_a.clone());
        let mut session_b = ChatSession::open(&project_b(), mock_b.clone());
        assert_ne!(session_a.id(), session_b.id());

        session_a.send("What does this do?").await.unwrap();
        session_b.send("What does this do?").await.unwrap();

        let (system_b, history_b) = &mock_b.chat_requests()[0];
        assert!(!system_b.contains("alpha secret"));
        assert!(system_b.contains("fn beta()"));
        assert_eq!(history_b.len(), 1);

        let (system_a, _) = &mock_a.chat_requests()[0];
        assert!(!system_a.contains("fn beta()"));
    }

    #[tokio::test]
    async fn test_shared_provider_keeps_sessions_apart() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok("a");
        mock.push_ok("b");
        let mut session_a = ChatSession::open(&project_a(), mock.clone());
        let mut session_b = ChatSession::open(&project_b(), mock.clone());

        session_a.send("first").await.unwrap();
        session_b.send("second").await.unwrap();

        let calls = mock.chat_requests();
        assert!(calls[1].0.contains("beta/lib.rs"));
        assert!(!calls[1].0.contains("alpha/main.py"));
        assert_eq!(calls[1].1.len(), 1);
        assert_eq!(calls[1].1[0].text, "second");
    }
}
