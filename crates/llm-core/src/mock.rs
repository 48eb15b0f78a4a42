//! Scripted Provider
//!
//! For testing and offline demo purposes. Replays queued replies in order and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::message::{Message, Role};
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo};

/// A request as seen by the scripted provider
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub model: String,
}

impl RecordedRequest {
    /// Content of the first message with this role
    pub fn content(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

/// Provider that replays a fixed script
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Reply used once the script runs out (None = fail)
    fallback: Option<String>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that answers every request with a short canned acknowledgement
    pub fn canned() -> Self {
        Self {
            fallback: Some(
                "This is an offline response. Configure LLM_PROVIDER to get a real analysis."
                    .into(),
            ),
            ..Self::default()
        }
    }

    /// Queue a successful reply
    #[must_use]
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, item: Result<String>) {
        lock(&self.replies).push_back(item);
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

/// The script and the log are only ever appended to or popped whole, so a
/// panic elsewhere never leaves them half-written; poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        lock(&self.requests).push(RecordedRequest {
            messages: messages.to_vec(),
            model: options.model.clone(),
        });

        let next = lock(&self.replies).pop_front();

        let content = match next {
            Some(reply) => reply?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::Provider("script exhausted".into()))?,
        };

        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "Scripted replies".into(),
        }])
    }
}
