use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde_json::Value;
use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::{
    models::{now_millis, ChatMessage},
    AppResult, GetField,
};

const ANONYMOUS: &str = "anonymous";
const CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

pub(crate) fn outbound(room: &str, content: &str, sender: &str) -> ChatMessage {
    ChatMessage {
        room: room.to_owned(),
        content: content.to_owned(),
        sender: sender.to_owned(),
        timestamp: now_millis(),
    }
}

pub(crate) fn to_frame(msg: &ChatMessage) -> AppResult<String> {
    Ok(serde_json::to_string(msg)?)
}

/// Reads an inbound frame. `room` and `content` are required; a missing
/// sender or timestamp is filled in rather than dropping the line.
pub fn decode(frame: &str) -> AppResult<ChatMessage> {
    let value: Value = serde_json::from_str(frame)?;

    let room = value.get_str_field("room")?;
    let content = value.get_str_field("content")?;
    let sender = value.get_opt_str_field("sender").unwrap_or(ANONYMOUS).to_owned();
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_i64)
        .unwrap_or_else(now_millis);

    Ok(ChatMessage { room, content, sender, timestamp })
}

/// Flattens markdown content into plain text for a terminal.
pub fn render_content(content: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_MATH) {
        match event {
            Event::Text(text)
            | Event::Code(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text)
            | Event::InlineHtml(text)
            | Event::Html(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("• "),
            Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                out.push('\n')
            }
            _ => {}
        }
    }
    out.trim_end().to_owned()
}

pub fn clock(timestamp: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp) * 1_000_000)
        .ok()
        .and_then(|at| at.format(CLOCK).ok())
        .unwrap_or_else(|| "--:--:--".to_owned())
}

pub fn format_line(msg: &ChatMessage) -> String {
    format!("[{}] {}: {}", clock(msg.timestamp), msg.sender, render_content(&msg.content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_fills_missing_sender_and_timestamp() {
        let msg = decode(r#"{"room":"lobby","content":"hi"}"#).unwrap();
        assert_eq!(msg.room, "lobby");
        assert_eq!(msg.sender, ANONYMOUS);
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn decode_rejects_untagged_or_plain_frames() {
        assert!(decode(r#"{"content":"hi"}"#).is_err());
        assert!(decode(r#"{"room":"lobby"}"#).is_err());
        assert!(decode("just some text").is_err());
    }

    #[test]
    fn outbound_frame_carries_every_field() {
        let msg = outbound("lobby", "hello", "Neo");
        let value: Value = serde_json::from_str(&to_frame(&msg).unwrap()).unwrap();
        assert_eq!(value["room"], "lobby");
        assert_eq!(value["content"], "hello");
        assert_eq!(value["sender"], "Neo");
        assert_eq!(value["timestamp"], msg.timestamp);
    }

    #[test]
    fn markdown_is_flattened() {
        assert_eq!(render_content("**wake up**, `neo`"), "wake up, neo");
        assert_eq!(render_content("one\n\ntwo"), "one\ntwo");
        assert_eq!(render_content("- red\n- blue"), "• red\n• blue");
    }

    #[test]
    fn line_uses_utc_clock() {
        let msg = ChatMessage {
            room: "lobby".to_owned(),
            content: "follow the white rabbit".to_owned(),
            sender: "Trinity".to_owned(),
            timestamp: 3_723_000,
        };
        assert_eq!(format_line(&msg), "[01:02:03] Trinity: follow the white rabbit");
    }
}
