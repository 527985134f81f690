// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait for a single completion backend attempt.

use async_trait::async_trait;

use crate::error::FrontdeskError;
use crate::types::PromptMessage;

/// One attempt against a completion backend, identified by a model id.
///
/// Implementations perform exactly one request with a bounded timeout and
/// report the raw generated text. Fallback across backends, response
/// cleaning, and retry policy live in the gateway, not here.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Sends the assembled context to the named backend and returns the
    /// raw generated text (possibly empty).
    async fn complete(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, FrontdeskError>;
}
