// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Frontdesk service.
//!
//! Provides the error type, domain types, and the two seam traits
//! (completion backend, operator channel) implemented by the adapter
//! crates and mocked in tests.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FrontdeskError;
pub use traits::{CompletionApi, OperatorApi};
pub use types::{
    Appointment, AppointmentStatus, Business, ChatMessage, HandoffRequest, HandoffRequestStatus,
    HandoffStatus, InlineButton, InlineKeyboard, OperatorEvent, OperatorUpdate, PromptMessage,
    Role, Session, SessionId,
};
