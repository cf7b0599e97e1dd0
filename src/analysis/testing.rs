//! Scripted provider for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::ai::provider::{ChatRequest, LlmProvider, LlmResponse, ModelRequest, TokenUsage};
use crate::ai::provider::{ResponseMetadata, ResponseTiming};
use crate::types::{ChatMessage, ErrorCategory, LlmError, MentorError, Result};

enum Scripted {
    Reply(String),
    Fail(ErrorCategory, String),
}

/// Replays queued replies in order and records every request it sees
#[derive(Default)]
pub(crate) struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ModelRequest>>,
    chats: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    generate_calls: AtomicUsize,
    converse_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_ok(&self, content: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(content.into()));
    }

    pub fn push_err(&self, category: ErrorCategory, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(category, message.into()));
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn converse_calls(&self) -> usize {
        self.converse_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// (system text, history) per chat call
    pub fn chat_requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.chats.lock().unwrap().clone()
    }

    async fn next_reply(&self) -> Result<LlmResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(content)) => Ok(LlmResponse::with_metrics(
                content,
                TokenUsage::new(120, 40),
                ResponseTiming { total_ms: 5 },
                ResponseMetadata {
                    model: "mock-model".to_string(),
                    provider: "mock".to_string(),
                    finish_reason: Some("stop".to_string()),
                },
            )),
            Some(Scripted::Fail(category, message)) => Err(MentorError::Llm(
                LlmError::with_provider(category, message, "mock"),
            )),
            None => Err(MentorError::LlmApi("mock script exhausted".to_string())),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<LlmResponse> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.next_reply().await
    }

    async fn converse(&self, request: ChatRequest<'_>) -> Result<LlmResponse> {
        self.converse_calls.fetch_add(1, Ordering::SeqCst);
        self.chats
            .lock()
            .unwrap()
            .push((request.system.to_string(), request.messages.to_vec()));
        self.next_reply().await
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
