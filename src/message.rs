//! Line protocol definitions
//!
//! Inbound chat lines are parsed into `ClientLine`; broadcast events are
//! immutable `Message` values rendered to text for clients and transcript.

use chrono::{DateTime, Local};

/// Timestamp layout used in chat lines and the transcript
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix of the in-band rename command
pub const RENAME_COMMAND: &str = "/name ";

/// Text of the "joined" system event
pub const JOINED_TEXT: &str = "has joined our chat...";
/// Text of the "left" system event
pub const LEFT_TEXT: &str = "has left our chat...";

/// Kind of broadcast event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Session registered
    Joined,
    /// Session closed
    Left,
    /// Session changed its display name
    Renamed,
    /// Text typed by a user
    Text,
}

/// A broadcast event
///
/// The sender name is a snapshot taken when the message was created, so a
/// later rename never alters history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub timestamp: DateTime<Local>,
    pub sender: String,
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    fn now(sender: &str, text: String, kind: MessageKind) -> Self {
        Self {
            timestamp: Local::now(),
            sender: sender.to_string(),
            text,
            kind,
        }
    }

    /// "joined" system event
    pub fn joined(name: &str) -> Self {
        Self::now(name, JOINED_TEXT.to_string(), MessageKind::Joined)
    }

    /// "left" system event
    pub fn left(name: &str) -> Self {
        Self::now(name, LEFT_TEXT.to_string(), MessageKind::Left)
    }

    /// "renamed" event, sent under the old name
    pub fn renamed(old_name: &str, new_name: &str) -> Self {
        Self::now(
            old_name,
            format!("changed their name to {}", new_name),
            MessageKind::Renamed,
        )
    }

    /// User text
    pub fn text(sender: &str, text: &str) -> Self {
        Self::now(sender, text.to_string(), MessageKind::Text)
    }

    /// Same sender and identical text
    ///
    /// Used for immediate-duplicate suppression; the timestamp is ignored.
    pub fn is_repeat_of(&self, other: &Message) -> bool {
        self.sender == other.sender && self.text == other.text
    }

    /// Join and leave notices are rendered without a timestamp
    pub fn is_presence_event(&self) -> bool {
        matches!(self.kind, MessageKind::Joined | MessageKind::Left)
    }

    /// Render the line delivered to clients (newline-terminated)
    pub fn render(&self) -> String {
        if self.is_presence_event() {
            format!("{} {}\n", self.sender, self.text)
        } else {
            self.transcript_line()
        }
    }

    /// Render the line appended to the transcript (newline-terminated)
    pub fn transcript_line(&self) -> String {
        format!(
            "[{}][{}]: {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.sender,
            self.text
        )
    }
}

/// A parsed inbound line from an active session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLine {
    /// `/name <newname>`; the raw target, not yet validated
    Rename(String),
    /// Any other non-empty line
    Chat(String),
}

impl ClientLine {
    /// Parse one inbound line
    ///
    /// Returns None for lines that are empty after trimming.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line.strip_prefix(RENAME_COMMAND) {
            Some(target) => Some(ClientLine::Rename(target.trim().to_string())),
            None => Some(ClientLine::Chat(line.to_string())),
        }
    }
}

/// Server → session writer message
#[derive(Debug, Clone)]
pub enum ServerMessage {
    /// A broadcast event, rendered per its kind
    Broadcast(Message),
    /// Raw text for this client only (prompts, validation errors)
    Notice(String),
}

impl ServerMessage {
    /// Text written to the socket
    pub fn to_wire(&self) -> String {
        match self {
            ServerMessage::Broadcast(msg) => msg.render(),
            ServerMessage::Notice(text) => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_fixed_time(mut msg: Message) -> Message {
        msg.timestamp = Local.with_ymd_and_hms(2024, 1, 2, 13, 4, 5).unwrap();
        msg
    }

    #[test]
    fn test_presence_events_render_without_timestamp() {
        assert_eq!(
            Message::joined("Alice").render(),
            "Alice has joined our chat...\n"
        );
        assert_eq!(Message::left("Bob").render(), "Bob has left our chat...\n");
    }

    #[test]
    fn test_text_renders_with_timestamp() {
        let msg = at_fixed_time(Message::text("Alice", "hello"));
        assert_eq!(msg.render(), "[2024-01-02 13:04:05][Alice]: hello\n");
    }

    #[test]
    fn test_user_text_that_looks_like_presence_keeps_timestamp() {
        let msg = at_fixed_time(Message::text("Bob", LEFT_TEXT));
        assert!(!msg.is_presence_event());
        assert_eq!(
            msg.render(),
            "[2024-01-02 13:04:05][Bob]: has left our chat...\n"
        );

        let msg = at_fixed_time(Message::text("Bob", "I joined our chat late"));
        assert_eq!(
            msg.render(),
            "[2024-01-02 13:04:05][Bob]: I joined our chat late\n"
        );
    }

    #[test]
    fn test_rename_renders_under_old_name() {
        let msg = at_fixed_time(Message::renamed("Alice", "Carol"));
        assert_eq!(
            msg.render(),
            "[2024-01-02 13:04:05][Alice]: changed their name to Carol\n"
        );
    }

    #[test]
    fn test_transcript_line_always_timestamped() {
        let msg = at_fixed_time(Message::joined("Alice"));
        assert_eq!(
            msg.transcript_line(),
            "[2024-01-02 13:04:05][Alice]: has joined our chat...\n"
        );
    }

    #[test]
    fn test_repeat_ignores_timestamp() {
        let first = at_fixed_time(Message::text("Alice", "hi"));
        let second = Message::text("Alice", "hi");
        assert!(second.is_repeat_of(&first));
        assert!(!Message::text("Bob", "hi").is_repeat_of(&first));
        assert!(!Message::text("Alice", "hi!").is_repeat_of(&first));
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        assert_eq!(ClientLine::parse(""), None);
        assert_eq!(ClientLine::parse("  \t "), None);
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            ClientLine::parse("/name  Carol \r"),
            Some(ClientLine::Rename("Carol".to_string()))
        );
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(
            ClientLine::parse("  hello world "),
            Some(ClientLine::Chat("hello world".to_string()))
        );
        // No space after the command means it is just text
        assert_eq!(
            ClientLine::parse("/name"),
            Some(ClientLine::Chat("/name".to_string()))
        );
        assert_eq!(
            ClientLine::parse("/names are fun"),
            Some(ClientLine::Chat("/names are fun".to_string()))
        );
    }

    #[test]
    fn test_notice_passes_through() {
        let msg = ServerMessage::Notice("[ENTER YOUR NAME]: ".to_string());
        assert_eq!(msg.to_wire(), "[ENTER YOUR NAME]: ");
    }
}
