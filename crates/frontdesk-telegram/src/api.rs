// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`OperatorApi`] implementation over the Telegram Bot API.
//!
//! Every call takes the bot token explicitly; one adapter instance serves
//! all businesses. Outbound text is sent with HTML parse mode, matching
//! the markup produced by the notification builders.

use std::time::Duration;

use async_trait::async_trait;
use frontdesk_core::{FrontdeskError, InlineKeyboard, OperatorApi, OperatorUpdate};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::wire::{ApiResponse, WireMessage, WireUpdate};

const API_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API client implementing the operator channel.
#[derive(Debug, Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new() -> Result<Self, FrontdeskError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FrontdeskError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn call<T: DeserializeOwned>(
        &self,
        bot_token: &str,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, FrontdeskError> {
        let url = format!("{}/bot{}/{}", self.base_url, bot_token, method);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FrontdeskError::Channel {
                message: format!("{method} request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(method, status = %status, "operator channel response");

        let body: ApiResponse<T> = response.json().await.map_err(|e| FrontdeskError::Channel {
            message: format!("failed to parse {method} response: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !body.ok {
            return Err(FrontdeskError::Channel {
                message: format!(
                    "{method} returned {status}: {}",
                    body.description.unwrap_or_else(|| "no description".into())
                ),
                source: None,
            });
        }
        body.result.ok_or_else(|| FrontdeskError::Channel {
            message: format!("{method} response carried no result"),
            source: None,
        })
    }
}

#[async_trait]
impl OperatorApi for TelegramApi {
    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<i64, FrontdeskError> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = serde_json::to_value(keyboard)
                .map_err(|e| FrontdeskError::Internal(format!("keyboard serialization: {e}")))?;
        }
        let message: WireMessage = self.call(bot_token, "sendMessage", payload).await?;
        Ok(message.message_id)
    }

    async fn send_reply(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        reply_to_message_id: i64,
    ) -> Result<i64, FrontdeskError> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "reply_to_message_id": reply_to_message_id,
        });
        let message: WireMessage = self.call(bot_token, "sendMessage", payload).await?;
        Ok(message.message_id)
    }

    async fn edit_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), FrontdeskError> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
        });
        // editMessageText returns the edited message; discard it.
        let _: WireMessage = self.call(bot_token, "editMessageText", payload).await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        bot_token: &str,
        callback_id: &str,
        text: &str,
    ) -> Result<(), FrontdeskError> {
        let payload = serde_json::json!({
            "callback_query_id": callback_id,
            "text": text,
        });
        let _: bool = self.call(bot_token, "answerCallbackQuery", payload).await?;
        Ok(())
    }

    async fn get_updates(
        &self,
        bot_token: &str,
        offset: i64,
    ) -> Result<Vec<OperatorUpdate>, FrontdeskError> {
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": 0,
        });
        let updates: Vec<WireUpdate> = self.call(bot_token, "getUpdates", payload).await?;
        Ok(updates
            .into_iter()
            .filter_map(WireUpdate::into_operator_update)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::{InlineButton, OperatorEvent};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:token";

    fn api(server: &MockServer) -> TelegramApi {
        TelegramApi::new().unwrap().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn send_message_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "9001",
                "parse_mode": "HTML",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 555}
            })))
            .mount(&server)
            .await;

        let message_id = api(&server)
            .send_message(TOKEN, "9001", "hello <b>there</b>", None)
            .await
            .unwrap();
        assert_eq!(message_id, 555);
    }

    #[tokio::test]
    async fn send_message_serializes_keyboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(serde_json::json!({
                "reply_markup": {
                    "inline_keyboard": [[{"text": "Accept", "callback_data": "ho_accept_3"}]]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 1}
            })))
            .mount(&server)
            .await;

        let keyboard =
            InlineKeyboard::single_row(vec![InlineButton::callback("Accept", "ho_accept_3")]);
        let result = api(&server)
            .send_message(TOKEN, "9001", "handoff", Some(keyboard))
            .await;
        assert!(result.is_ok(), "got: {result:?}");
    }

    #[tokio::test]
    async fn api_level_failure_is_a_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = api(&server)
            .send_message(TOKEN, "9001", "x", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("channel error"), "got: {err}");
    }

    #[tokio::test]
    async fn get_updates_converts_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/getUpdates")))
            .and(body_partial_json(serde_json::json!({"offset": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 7,
                        "callback_query": {"id": "cb", "data": "ho_end_2", "message": {"message_id": 9}}
                    },
                    {
                        "update_id": 8,
                        "message": {"message_id": 10, "chat": {"id": 9001}, "text": "/r 2 on my way"}
                    },
                    {
                        "update_id": 9,
                        "message": {"message_id": 11, "chat": {"id": 9001}}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let updates = api(&server).get_updates(TOKEN, 7).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert!(matches!(updates[0].event, OperatorEvent::Callback { .. }));
        assert!(matches!(updates[1].event, OperatorEvent::Text { .. }));
    }

    #[tokio::test]
    async fn answer_callback_accepts_bool_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/answerCallbackQuery")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": true
            })))
            .mount(&server)
            .await;

        assert!(api(&server).answer_callback(TOKEN, "cb-1", "done").await.is_ok());
    }
}
