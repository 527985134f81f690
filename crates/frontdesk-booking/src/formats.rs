// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strict parsing of customer-supplied appointment times.
//!
//! Only unambiguous, fully-specified literals are accepted; anything vague
//! ("tomorrow afternoon") is pushed back to the customer for correction.

use chrono::NaiveDateTime;

/// Accepted literal formats, tried in order.
const FORMATS: &[&str] = &[
    "%d %b %Y, %I:%M %p", // 12 Feb 2026, 4:00 PM
    "%d %B %Y, %I:%M %p", // 12 February 2026, 4:00 PM
    "%d %b %Y, %H:%M",    // 12 Feb 2026, 16:00
];

/// Parse a preferred-time literal; `None` means the customer must rephrase.
pub fn parse_strict_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn abbreviated_month_with_meridiem() {
        let dt = parse_strict_date("12 Feb 2026, 4:00 PM").unwrap();
        assert_eq!((dt.day(), dt.month(), dt.year()), (12, 2, 2026));
        assert_eq!((dt.hour(), dt.minute()), (16, 0));
    }

    #[test]
    fn full_month_with_meridiem() {
        let dt = parse_strict_date("12 February 2026, 4:00 PM").unwrap();
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn twenty_four_hour_clock() {
        let dt = parse_strict_date("12 Feb 2026, 16:00").unwrap();
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert!(parse_strict_date("  12 Feb 2026, 4:00 PM  ").is_some());
    }

    #[test]
    fn vague_phrases_are_rejected() {
        for raw in ["tomorrow at 4", "next Tuesday", "Feb 12", "4 PM", ""] {
            assert!(parse_strict_date(raw).is_none(), "accepted: {raw}");
        }
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(parse_strict_date("30 Feb 2026, 4:00 PM").is_none());
        assert!(parse_strict_date("12 Feb 2026, 13:00 PM").is_none());
    }
}
