// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible chat-completions API.
//!
//! Provides [`OpenRouterClient`], which handles request construction,
//! bearer authentication, and the per-attempt timeout. Model fallback
//! lives one level up in [`crate::Gateway`].

use std::time::Duration;

use async_trait::async_trait;
use frontdesk_config::model::GatewayConfig;
use frontdesk_core::{CompletionApi, FrontdeskError, PromptMessage};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling parameters used for every completion request.
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;
const TOP_P: f64 = 0.95;

/// A chat-completions request body.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the completion backend.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterClient {
    /// Creates a new client from the gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, FrontdeskError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| FrontdeskError::Config(format!("invalid API key header value: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(referer) = &config.referer {
            let value = HeaderValue::from_str(referer)
                .map_err(|e| FrontdeskError::Config(format!("invalid referer header value: {e}")))?;
            headers.insert("HTTP-Referer", value);
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.attempt_timeout_secs))
            .build()
            .map_err(|e| FrontdeskError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl CompletionApi for OpenRouterClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, FrontdeskError> {
        let request = ChatRequest {
            model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| FrontdeskError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FrontdeskError::Gateway {
                message: format!("backend returned {status}: {body}"),
                source: None,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| FrontdeskError::Gateway {
            message: format!("failed to parse completion response: {e}"),
            source: Some(Box::new(e)),
        })?;

        match body.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(FrontdeskError::Gateway {
                message: format!("model {model} returned an empty completion"),
                source: None,
            }),
        }
    }
}
