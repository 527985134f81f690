// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking-window enforcement against a free-text hours string.
//!
//! The window is configured per business as `Day-Day start - end`, e.g.
//! `Mon-Sat 9:00 AM - 5:00 PM`. Anything the parser cannot understand
//! fails open: the slot is allowed and the configured text is left to the
//! model to reason about in prose.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use tracing::debug;

static HOURS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\w+)-(\w+)\s+(\d+:\d+\s+[AP]M)\s*-\s*(\d+:\d+\s+[AP]M)").unwrap()
});

const DAY_NAMES: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const DAY_ABBRS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn day_number(name: &str) -> Option<u32> {
    let position = |names: &[&str]| {
        names
            .iter()
            .position(|d| d.eq_ignore_ascii_case(name))
            .map(|i| i as u32)
    };
    position(DAY_NAMES).or_else(|| position(DAY_ABBRS))
}

/// Check a requested slot against the configured booking window.
///
/// Returns `None` when the slot is allowed (including every case where the
/// window string is absent or unparseable) and a customer-facing rejection
/// reason otherwise.
pub fn check_booking_hours(requested: NaiveDateTime, hours: &str) -> Option<String> {
    if hours.trim().is_empty() || hours.to_lowercase().contains("not specified") {
        return None;
    }

    let Some(captures) = HOURS_PATTERN.captures(hours) else {
        debug!(hours, "booking window not parseable, allowing slot");
        return None;
    };

    let (start_day_raw, end_day_raw) = (&captures[1], &captures[2]);
    let (start_time_raw, end_time_raw) = (&captures[3], &captures[4]);

    let (Some(start_day), Some(end_day)) = (day_number(start_day_raw), day_number(end_day_raw))
    else {
        debug!(hours, "unrecognized day names, allowing slot");
        return None;
    };

    let weekday = requested.weekday().num_days_from_monday();
    let within_days = if start_day <= end_day {
        (start_day..=end_day).contains(&weekday)
    } else {
        // Window wraps the week boundary, e.g. Fri-Tue.
        weekday >= start_day || weekday <= end_day
    };
    if !within_days {
        return Some(format!(
            "We are only open from {start_day_raw} to {end_day_raw}."
        ));
    }

    let parse_time = |raw: &str| NaiveTime::parse_from_str(raw, "%I:%M %p").ok();
    let (Some(start_time), Some(end_time)) = (parse_time(start_time_raw), parse_time(end_time_raw))
    else {
        debug!(hours, "booking times not parseable, allowing slot");
        return None;
    };

    let requested_time = requested.time();
    // Seconds never appear in the literal formats; compare to the minute.
    let requested_time = requested_time.with_second(0).unwrap_or(requested_time);
    if requested_time < start_time || requested_time > end_time {
        return Some(format!(
            "Our appointment hours are {start_time_raw} to {end_time_raw}."
        ));
    }

    None
}
