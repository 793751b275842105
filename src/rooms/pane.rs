use url::Url;

use crate::{models::ChatMessage, AppResult};

use super::{msg, ws::LiveConnection, ChatError};

/// The open chat view: at most one live connection, plus the messages that
/// arrived for its room since it was opened.
pub struct ChatPane {
    ws_url: Url,
    sender: Option<String>,
    room: Option<String>,
    messages: Vec<ChatMessage>,
    conn: Option<LiveConnection>,
}

impl ChatPane {
    pub fn new(ws_url: Url) -> ChatPane {
        ChatPane {
            ws_url,
            sender: None,
            room: None,
            messages: Vec::new(),
            conn: None,
        }
    }

    /// Display name stamped on outbound messages.
    pub fn set_sender(&mut self, sender: Option<String>) {
        self.sender = sender;
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Tears down the current connection before opening one for `room`.
    /// History is per-room and starts empty.
    pub async fn switch(&mut self, room: &str) -> AppResult<()> {
        self.close().await;
        self.room = Some(room.to_owned());

        let conn = LiveConnection::open(&self.ws_url, room).await?;
        self.conn = Some(conn);
        Ok(())
    }

    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close().await;
        }
        self.room = None;
        self.messages.clear();
    }

    /// Sends right away and does not echo locally; the line shows up when
    /// the server relays it back.
    pub async fn send(&mut self, text: &str) -> AppResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage)?;
        }
        let Some(sender) = self.sender.as_deref() else {
            return Err(ChatError::NoSender)?;
        };
        let Some(conn) = self.conn.as_mut() else {
            return Err(ChatError::NotConnected)?;
        };

        let outbound = msg::outbound(conn.room(), text, sender);
        conn.send(&outbound).await?;
        tracing::debug!(room = %outbound.room, "sent message");
        Ok(())
    }

    /// Waits for the next message tagged for this room, appends it, and
    /// returns a copy. `None` once there is no connection left to read.
    pub async fn next_message(&mut self) -> Option<ChatMessage> {
        loop {
            let conn = self.conn.as_mut()?;
            let Some(msg) = conn.recv().await else {
                tracing::info!(room = %conn.room(), "connection closed by server");
                self.conn = None;
                return None;
            };
            if self.accept(msg.clone()) {
                return Some(msg);
            }
        }
    }

    /// Appends `msg` if it belongs to the active room.
    pub fn accept(&mut self, msg: ChatMessage) -> bool {
        if self.room.as_deref() != Some(msg.room.as_str()) {
            tracing::trace!(room = %msg.room, "ignoring message for another room");
            return false;
        }
        self.messages.push(msg);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(room: &str, content: &str) -> ChatMessage {
        ChatMessage {
            room: room.to_owned(),
            content: content.to_owned(),
            sender: "Neo".to_owned(),
            timestamp: 0,
        }
    }

    fn pane_in(room: &str) -> ChatPane {
        let mut pane = ChatPane::new(Url::parse("ws://localhost:1/ws").unwrap());
        pane.room = Some(room.to_owned());
        pane
    }

    #[test]
    fn only_active_room_is_appended_in_order() {
        let mut pane = pane_in("lobby");

        assert!(pane.accept(line("lobby", "one")));
        assert!(!pane.accept(line("dojo", "elsewhere")));
        assert!(pane.accept(line("lobby", "two")));

        let contents: Vec<_> = pane.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["one", "two"]);
    }

    #[test]
    fn nothing_is_appended_without_a_room() {
        let mut pane = ChatPane::new(Url::parse("ws://localhost:1/ws").unwrap());
        assert!(!pane.accept(line("lobby", "hello")));
        assert!(pane.messages().is_empty());
    }

    #[tokio::test]
    async fn send_checks_text_then_sender() {
        let mut pane = pane_in("lobby");

        let err = pane.send("   ").await.unwrap_err();
        assert_eq!(err.downcast_ref::<ChatError>(), Some(&ChatError::EmptyMessage));

        let err = pane.send("hi").await.unwrap_err();
        assert_eq!(err.downcast_ref::<ChatError>(), Some(&ChatError::NoSender));

        pane.set_sender(Some("Neo".to_owned()));
        let err = pane.send("hi").await.unwrap_err();
        assert_eq!(err.downcast_ref::<ChatError>(), Some(&ChatError::NotConnected));
    }

    #[tokio::test]
    async fn close_forgets_history() {
        let mut pane = pane_in("lobby");
        pane.accept(line("lobby", "one"));

        pane.close().await;
        assert_eq!(pane.room(), None);
        assert!(pane.messages().is_empty());
    }
}
