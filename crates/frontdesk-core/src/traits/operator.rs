// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait for the operator messaging channel.

use async_trait::async_trait;

use crate::error::FrontdeskError;
use crate::types::{InlineKeyboard, OperatorUpdate};

/// Outbound and pull-side operations on the operator channel.
///
/// All methods take the bot token explicitly: one process serves many
/// businesses, each with its own bot identity.
#[async_trait]
pub trait OperatorApi: Send + Sync {
    /// Sends a notification, optionally with interactive affordances.
    /// Returns the channel-assigned message id for later edits.
    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<i64, FrontdeskError>;

    /// Sends a reply threaded onto an earlier message.
    async fn send_reply(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        reply_to_message_id: i64,
    ) -> Result<i64, FrontdeskError>;

    /// Replaces the text of a previously sent message, dropping its buttons.
    async fn edit_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), FrontdeskError>;

    /// Acknowledges a button press, dismissing the channel's loading state.
    async fn answer_callback(
        &self,
        bot_token: &str,
        callback_id: &str,
        text: &str,
    ) -> Result<(), FrontdeskError>;

    /// Fetches the batch of updates at or past `offset` (pull path).
    async fn get_updates(
        &self,
        bot_token: &str,
        offset: i64,
    ) -> Result<Vec<OperatorUpdate>, FrontdeskError>;
}
