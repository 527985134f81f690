// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion gateway with ordered model fallback.
//!
//! The [`Gateway`] walks a configured list of model identifiers in order,
//! treating HTTP failures, timeouts, and empty completions alike as a cue
//! to try the next model. Only when the whole list is exhausted does a
//! structured error surface to the caller.

pub mod client;
pub mod scrub;

use std::sync::Arc;

use frontdesk_core::{CompletionApi, FrontdeskError, PromptMessage};
use tracing::{debug, warn};

pub use client::OpenRouterClient;

/// A completion frontend over an ordered list of fallback models.
pub struct Gateway {
    backend: Arc<dyn CompletionApi>,
    models: Vec<String>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn CompletionApi>, models: Vec<String>) -> Self {
        Self { backend, models }
    }

    /// Generate one assistant reply for the given prompt.
    ///
    /// Each model is given one attempt. A reply that is empty after
    /// reasoning-block scrubbing counts as a failure and falls through to
    /// the next model.
    pub async fn generate(&self, messages: &[PromptMessage]) -> Result<String, FrontdeskError> {
        let mut last_error: Option<FrontdeskError> = None;

        for model in &self.models {
            match self.backend.complete(model, messages).await {
                Ok(raw) => {
                    let text = scrub::strip_reasoning(&raw).trim().to_string();
                    if text.is_empty() {
                        debug!(model, "completion empty after scrubbing, trying next model");
                        last_error = Some(FrontdeskError::Gateway {
                            message: format!("model {model} returned an empty completion"),
                            source: None,
                        });
                        continue;
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!(model, error = %e, "completion attempt failed, trying next model");
                    last_error = Some(e);
                }
            }
        }

        Err(FrontdeskError::Gateway {
            message: "all completion backends failed".into(),
            source: last_error.map(|e| Box::new(e) as _),
        })
    }
}
