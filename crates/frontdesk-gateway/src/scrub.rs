// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cleanup of raw model output before it reaches the session log.

use std::sync::LazyLock;

use regex::Regex;

static REASONING_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<think>.*?</think>").unwrap());

// Some backends emit an opening tag and never close it.
static UNCLOSED_REASONING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<think>.*$").unwrap());

/// Remove inline reasoning blocks that some backends interleave with the
/// visible reply.
pub fn strip_reasoning(text: &str) -> String {
    let without_blocks = REASONING_BLOCK.replace_all(text, "");
    UNCLOSED_REASONING.replace_all(&without_blocks, "").into_owned()
}
