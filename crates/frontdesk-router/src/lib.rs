// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session routing: the single entry point for a user turn.

pub mod prompt;
pub mod router;

pub use router::{SessionRouter, TurnOutcome};
