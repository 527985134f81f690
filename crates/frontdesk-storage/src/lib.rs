// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Frontdesk service.
//!
//! One [`Database`] handle is shared across the router, booking pipeline,
//! and operator bridge; the [`queries`] modules are the only code that
//! touches SQL.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;

/// Millisecond-precision UTC timestamp in the format stored in SQLite.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
