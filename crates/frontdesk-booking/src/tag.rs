// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of the structured confirmation block from model output.
//!
//! A compliant reply carries at most one block of the form:
//!
//! ```text
//! [APPOINTMENT_CONFIRMED]
//! Name: Jo Patel
//! Email: jo@example.com
//! Mobile: +1 555 0100
//! Time: 12 Feb 2026, 4:00 PM
//! Message: first visit
//! [/APPOINTMENT_CONFIRMED]
//! ```
//!
//! The block is machine-facing and is always stripped from the text shown
//! to the user, whether or not it parsed.

use std::sync::LazyLock;

use regex::Regex;

const OPEN_TAG: &str = "[APPOINTMENT_CONFIRMED]";

static CONFIRMATION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\[APPOINTMENT_CONFIRMED\]\s*Name:\s*(.+?)\s*Email:\s*(.+?)\s*Mobile:\s*(.+?)\s*Time:\s*(.+?)\s*Message:\s*(.+?)\s*\[/APPOINTMENT_CONFIRMED\]",
    )
    .unwrap()
});

static BLOCK_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[APPOINTMENT_CONFIRMED\].*?\[/APPOINTMENT_CONFIRMED\]").unwrap()
});

/// The five fields of a parsed confirmation block, whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_mobile: String,
    pub preferred_time: String,
    pub note: String,
}

/// Result of scanning a reply for the confirmation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagScan {
    /// A well-formed block with all five fields.
    Found(AppointmentDetails),
    /// No opening tag anywhere in the reply.
    Absent,
    /// An opening tag is present but the block is incomplete or misshapen.
    Malformed,
}

/// Scan a model reply for the confirmation block.
pub fn scan(text: &str) -> TagScan {
    if let Some(captures) = CONFIRMATION_BLOCK.captures(text) {
        return TagScan::Found(AppointmentDetails {
            customer_name: captures[1].trim().to_string(),
            customer_email: captures[2].trim().to_string(),
            customer_mobile: captures[3].trim().to_string(),
            preferred_time: captures[4].trim().to_string(),
            note: captures[5].trim().to_string(),
        });
    }
    if text.contains(OPEN_TAG) {
        return TagScan::Malformed;
    }
    TagScan::Absent
}

/// Remove every confirmation block (and any dangling opening tag) from the
/// user-visible reply.
pub fn strip_block(text: &str) -> String {
    let stripped = BLOCK_SPAN.replace_all(text, "");
    stripped.replace(OPEN_TAG, "").trim().to_string()
}
