// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits implemented by the external-facing adapter crates.

pub mod completion;
pub mod operator;

pub use completion::CompletionApi;
pub use operator::OperatorApi;
