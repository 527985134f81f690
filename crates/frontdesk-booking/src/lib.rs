// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment extraction and booking for the Frontdesk service.
//!
//! Model output is scanned for a structured confirmation block
//! ([`tag`]); extracted details run through the validation pipeline
//! ([`pipeline`]): strict time-format parsing ([`formats`]), the
//! per-business booking window ([`hours`]), and exact-slot conflict
//! detection, before the request is stored and announced to the operator.

pub mod formats;
pub mod hours;
pub mod pipeline;
pub mod tag;

pub use pipeline::{process_confirmation, BookingOutcome};
pub use tag::{AppointmentDetails, TagScan};
