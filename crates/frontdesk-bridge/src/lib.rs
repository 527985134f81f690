// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-side bridge.
//!
//! Connects sessions to a human operator over the operator channel:
//! handoff lifecycle, appointment review buttons, and ingestion of
//! operator updates from both the poll loop and webhooks.

pub mod commands;
pub mod handoff;
pub mod ingest;
pub mod review;

pub use commands::{parse_callback, parse_text, CallbackCommand, TextCommand};
pub use handoff::{CONNECTING_NOTICE, STILL_CONNECTING};
pub use ingest::Ingestor;
