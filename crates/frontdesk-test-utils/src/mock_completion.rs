// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion backend for deterministic testing.
//!
//! Replies are scripted in order; each `complete()` call consumes one.
//! Calls are captured with their model id and prompt for assertion.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use frontdesk_core::{CompletionApi, FrontdeskError, PromptMessage};

/// One recorded completion call.
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub model: String,
    pub messages: Vec<PromptMessage>,
}

/// A mock completion backend with a scripted reply queue.
pub struct MockCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a successful reply for the next unconsumed call.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Script a failure for the next unconsumed call.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionApi for MockCompletion {
    async fn complete(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, FrontdeskError> {
        self.calls.lock().unwrap().push(CompletionCall {
            model: model.to_string(),
            messages: messages.to_vec(),
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(FrontdeskError::Gateway {
                message,
                source: None,
            }),
            None => Err(FrontdeskError::Gateway {
                message: "no scripted reply left in mock".into(),
                source: None,
            }),
        }
    }
}
