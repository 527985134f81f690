// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: booking instructions appended to the business's base
//! prompt, and the ephemeral status note injected on status questions.

use frontdesk_core::{Appointment, AppointmentStatus, Business};

/// Substring keywords that make a user message count as a status question.
const STATUS_KEYWORDS: [&str; 7] = [
    "status",
    "appointment",
    "booking",
    "booked",
    "confirmed",
    "approved",
    "declined",
];

/// Seed prompt for businesses whose profile carries none.
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful business assistant.";

pub fn wants_status_summary(text: &str) -> bool {
    let lower = text.to_lowercase();
    STATUS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// The leading system message for a gateway call: the stored base prompt
/// plus, when booking is enabled, the booking rules with the currently
/// unavailable slots.
pub fn system_context(business: &Business, booked_slots: &[String]) -> String {
    let base = if business.system_prompt.is_empty() {
        FALLBACK_SYSTEM_PROMPT
    } else {
        business.system_prompt.as_str()
    };
    if !business.appointment_enabled {
        return base.to_string();
    }
    format!("{base}{}", appointment_addon(business, booked_slots))
}

fn appointment_addon(business: &Business, booked_slots: &[String]) -> String {
    let unavailable = if booked_slots.is_empty() {
        "No slots booked yet.".to_string()
    } else {
        booked_slots
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let hours = if business.appointment_hours.trim().is_empty() {
        "Not specified (assume standard business hours)"
    } else {
        business.appointment_hours.as_str()
    };

    format!(
        "\n\
         \u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\n\
         APPOINTMENT BOOKING \u{2014} CRITICAL RULES:\n\
         \u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\n\
         When a customer wants to book an appointment:\n\
         \n\
         1. Ask for details in ONE concise message:\n\
         \x20  \"To book, please provide:\n\
         \x20  \u{1f4dd} **Name** | \u{1f4e7} **Email** | \u{1f4f1} **Mobile**\n\
         \x20  \u{1f4c5} **Preferred Date & Time** (Format: 12 Feb 2026, 4:00 PM)\n\
         \x20  \u{1f4ac} **Notes** (optional)\"\n\
         \n\
         2. **PRE-VALIDATION (CRITICAL)**:\n\
         \x20  Below are the slots already BOOKED. If the user picks one of these, tell them \
         immediately it's taken and ask for a different slot:\n\
         \x20  {unavailable}\n\
         \n\
         3. Valid Booking Hours: {hours}\n\
         \x20  If outside these hours, politely suggest an alternative.\n\
         \n\
         4. Once you have ALL details (Name, Email, Mobile, strict Date/Time), include this \
         EXACT block at the end:\n\
         \n\
         [APPOINTMENT_CONFIRMED]\n\
         Name: <full name>\n\
         Email: <email>\n\
         Mobile: <mobile number>\n\
         Time: <strict date and time>\n\
         Message: <additional notes or None>\n\
         [/APPOINTMENT_CONFIRMED]\n\
         \n\
         \u{2705} \"Great! Your request is submitted. You'll get a confirmation soon. Check \
         status anytime by asking 'What's my appointment status?'\"\n\
         \n\
         \u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\n\
         APPOINTMENT STATUS CHECK:\n\
         \u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\n\
         If asked about status, use these emojis:\n\
         - \u{1f7e1} Pending: \"Under review\"\n\
         - \u{2705} Approved: \"Confirmed!\"\n\
         - \u{274c} Declined: \"Declined. Please pick another time.\"\n"
    )
}

/// Ephemeral system note summarizing this customer's own appointment
/// records. Never persisted to the session log.
pub fn status_note(appointments: &[Appointment]) -> String {
    let mut note = String::from("\n\nCURRENT APPOINTMENT STATUS FOR THIS CUSTOMER:\n");
    for apt in appointments {
        let emoji = match apt.status {
            AppointmentStatus::Pending => "\u{1f7e1}",
            AppointmentStatus::Approved => "\u{2705}",
            AppointmentStatus::Declined => "\u{274c}",
        };
        note.push_str(&format!(
            "- Appointment #{}: {emoji} {}\n  Name: {}, Time: {}\n",
            apt.id,
            apt.status.to_string().to_uppercase(),
            apt.customer_name,
            apt.preferred_time,
        ));
    }
    note.push_str("\nPlease share this status with the customer in a friendly way.");
    note
}
