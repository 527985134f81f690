// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock operator channel for deterministic testing.
//!
//! Outbound traffic (sends, replies, edits, callback answers) is captured
//! for assertion; `get_updates` batches are scripted in order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use frontdesk_core::{FrontdeskError, InlineKeyboard, OperatorApi, OperatorUpdate};

/// A captured `send_message` call.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub bot_token: String,
    pub chat_id: String,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
    pub message_id: i64,
}

/// A captured `send_reply` call.
#[derive(Debug, Clone)]
pub struct SentReply {
    pub bot_token: String,
    pub chat_id: String,
    pub text: String,
    pub reply_to_message_id: i64,
}

/// A captured `edit_message` call.
#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub chat_id: String,
    pub message_id: i64,
    pub text: String,
}

/// A mock operator channel with captured outbound calls.
pub struct MockOperator {
    sent: Mutex<Vec<SentMessage>>,
    replies: Mutex<Vec<SentReply>>,
    edits: Mutex<Vec<EditedMessage>>,
    answered: Mutex<Vec<(String, String)>>,
    update_batches: Mutex<VecDeque<Vec<OperatorUpdate>>>,
    next_message_id: AtomicI64,
    fail_sends: AtomicBool,
}

impl MockOperator {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            answered: Mutex::new(Vec::new()),
            update_batches: Mutex::new(VecDeque::new()),
            next_message_id: AtomicI64::new(100),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Script a batch for the next `get_updates` call.
    pub fn queue_updates(&self, batch: Vec<OperatorUpdate>) {
        self.update_batches.lock().unwrap().push_back(batch);
    }

    /// Make every subsequent outbound call fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn edited_messages(&self) -> Vec<EditedMessage> {
        self.edits.lock().unwrap().clone()
    }

    /// `(callback_id, text)` pairs acknowledged so far.
    pub fn answered_callbacks(&self) -> Vec<(String, String)> {
        self.answered.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), FrontdeskError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(FrontdeskError::Channel {
                message: "mock channel configured to fail".into(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorApi for MockOperator {
    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<i64, FrontdeskError> {
        self.check_failure()?;
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(SentMessage {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            keyboard,
            message_id,
        });
        Ok(message_id)
    }

    async fn send_reply(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        reply_to_message_id: i64,
    ) -> Result<i64, FrontdeskError> {
        self.check_failure()?;
        self.replies.lock().unwrap().push(SentReply {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            reply_to_message_id,
        });
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_message(
        &self,
        _bot_token: &str,
        chat_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), FrontdeskError> {
        self.check_failure()?;
        self.edits.lock().unwrap().push(EditedMessage {
            chat_id: chat_id.to_string(),
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn answer_callback(
        &self,
        _bot_token: &str,
        callback_id: &str,
        text: &str,
    ) -> Result<(), FrontdeskError> {
        self.check_failure()?;
        self.answered
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn get_updates(
        &self,
        _bot_token: &str,
        _offset: i64,
    ) -> Result<Vec<OperatorUpdate>, FrontdeskError> {
        self.check_failure()?;
        Ok(self
            .update_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
