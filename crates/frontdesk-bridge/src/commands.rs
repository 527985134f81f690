// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of operator input: callback tokens from button presses and
//! text commands typed into the operator chat.

use std::sync::LazyLock;

use regex::Regex;

/// A decoded button-press token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackCommand {
    ApproveAppointment(i64),
    DeclineAppointment(i64),
    AcceptHandoff(i64),
    DeclineHandoff(i64),
    EndHandoff(i64),
}

/// A decoded operator text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    /// `/r <request-id> <message>` routes a reply into one session.
    Reply { request_id: i64, text: String },
    /// `/end <request-id>` closes one tunnel.
    End(i64),
    /// Plain prose: tunneled to the business's active session, if any.
    Tunnel(String),
    /// Commands and mentions that decode to nothing actionable.
    Noop,
}

static CALLBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(apt_approve|apt_decline|ho_accept|ho_decline|ho_end)_(\d+)$").unwrap());

// Bots in group chats see commands prefixed with a mention.
static REPLY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^(?:@\w+\s+)?/r\s+(\d+)\s+(.+)").unwrap());

/// Decode a callback token. Unknown tokens yield `None` and are ignored.
pub fn parse_callback(data: &str) -> Option<CallbackCommand> {
    let captures = CALLBACK_PATTERN.captures(data)?;
    let id: i64 = captures[2].parse().ok()?;
    Some(match &captures[1] {
        "apt_approve" => CallbackCommand::ApproveAppointment(id),
        "apt_decline" => CallbackCommand::DeclineAppointment(id),
        "ho_accept" => CallbackCommand::AcceptHandoff(id),
        "ho_decline" => CallbackCommand::DeclineHandoff(id),
        "ho_end" => CallbackCommand::EndHandoff(id),
        _ => unreachable!("pattern alternation is exhaustive"),
    })
}

/// Decode an operator text message.
pub fn parse_text(text: &str) -> TextCommand {
    let text = text.trim();

    if let Some(captures) = REPLY_PATTERN.captures(text) {
        if let Ok(request_id) = captures[1].parse() {
            return TextCommand::Reply {
                request_id,
                text: captures[2].trim().to_string(),
            };
        }
    }

    let lower = text.to_lowercase();
    if lower.starts_with("/end ") || (lower.starts_with('@') && lower.contains("/end ")) {
        let mut parts = text.split_whitespace();
        if parts.any(|p| p.eq_ignore_ascii_case("/end")) {
            if let Some(Ok(request_id)) = parts.next().map(str::parse::<i64>) {
                return TextCommand::End(request_id);
            }
        }
        return TextCommand::Noop;
    }

    if text.starts_with('/') || text.starts_with('@') {
        return TextCommand::Noop;
    }
    TextCommand::Tunnel(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_tokens_decode() {
        assert_eq!(
            parse_callback("apt_approve_12"),
            Some(CallbackCommand::ApproveAppointment(12))
        );
        assert_eq!(
            parse_callback("apt_decline_3"),
            Some(CallbackCommand::DeclineAppointment(3))
        );
        assert_eq!(parse_callback("ho_accept_5"), Some(CallbackCommand::AcceptHandoff(5)));
        assert_eq!(parse_callback("ho_decline_5"), Some(CallbackCommand::DeclineHandoff(5)));
        assert_eq!(parse_callback("ho_end_9"), Some(CallbackCommand::EndHandoff(9)));
    }

    #[test]
    fn unknown_callback_tokens_are_ignored() {
        assert_eq!(parse_callback("apt_approve_"), None);
        assert_eq!(parse_callback("something_else"), None);
        assert_eq!(parse_callback("ho_end_9_extra"), None);
    }

    #[test]
    fn reply_command_decodes_with_multiline_text() {
        let command = parse_text("/r 7 on my way,\nbe there soon");
        assert_eq!(
            command,
            TextCommand::Reply {
                request_id: 7,
                text: "on my way,\nbe there soon".into()
            }
        );
    }

    #[test]
    fn reply_command_tolerates_a_leading_mention() {
        let command = parse_text("@acme_bot /r 7 hello");
        assert_eq!(
            command,
            TextCommand::Reply {
                request_id: 7,
                text: "hello".into()
            }
        );
    }

    #[test]
    fn end_command_decodes() {
        assert_eq!(parse_text("/end 3"), TextCommand::End(3));
        assert_eq!(parse_text("@acme_bot /end 3"), TextCommand::End(3));
    }

    #[test]
    fn end_without_an_id_is_a_noop() {
        assert_eq!(parse_text("/end soon"), TextCommand::Noop);
    }

    #[test]
    fn plain_prose_is_tunneled() {
        assert_eq!(
            parse_text("we can fit you in at 3"),
            TextCommand::Tunnel("we can fit you in at 3".into())
        );
    }

    #[test]
    fn other_slash_commands_are_noops() {
        assert_eq!(parse_text("/start"), TextCommand::Noop);
        assert_eq!(parse_text("@someone hello"), TextCommand::Noop);
    }
}
