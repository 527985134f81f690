// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters and fixtures shared by Frontdesk tests.
//!
//! Provides [`MockCompletion`] and [`MockOperator`] with scripted outcomes
//! and captured calls, plus a seeded temporary-database harness.

pub mod fixtures;
pub mod mock_completion;
pub mod mock_operator;

pub use fixtures::{seeded_db, test_business, test_session};
pub use mock_completion::MockCompletion;
pub use mock_operator::{EditedMessage, MockOperator, SentMessage, SentReply};
