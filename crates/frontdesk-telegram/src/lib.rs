// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram Bot API adapter for the Frontdesk operator channel.

pub mod api;
pub mod wire;

pub use api::TelegramApi;
pub use wire::WireUpdate;
