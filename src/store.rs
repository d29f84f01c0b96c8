//! Message history
//!
//! Append-only, never truncated while the process runs.

use crate::message::Message;

/// Ordered record of every delivered message
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `msg` repeats the most recent entry (same sender and text)
    ///
    /// Only the last entry is compared; older identical messages do not count.
    pub fn is_immediate_duplicate(&self, msg: &Message) -> bool {
        self.messages
            .last()
            .is_some_and(|last| msg.is_repeat_of(last))
    }

    /// Append a message, returning its position
    pub fn append(&mut self, msg: Message) -> usize {
        self.messages.push(msg);
        self.messages.len() - 1
    }

    /// History in delivery order, leaving out the entry at `skip`
    pub fn replay(&self, skip: Option<usize>) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != skip)
            .map(|(_, msg)| msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut store = MessageStore::new();
        assert_eq!(store.replay(None).count(), 0);

        assert_eq!(store.append(Message::text("Alice", "one")), 0);
        assert_eq!(store.append(Message::text("Bob", "two")), 1);

        let texts: Vec<_> = store.replay(None).map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn test_immediate_duplicate_only_checks_last_entry() {
        let mut store = MessageStore::new();
        let hello = Message::text("Alice", "hello");
        assert!(!store.is_immediate_duplicate(&hello));

        store.append(hello.clone());
        assert!(store.is_immediate_duplicate(&Message::text("Alice", "hello")));
        assert!(!store.is_immediate_duplicate(&Message::text("Bob", "hello")));

        store.append(Message::text("Bob", "hi"));
        assert!(!store.is_immediate_duplicate(&hello));
    }

    #[test]
    fn test_replay_skips_one_entry() {
        let mut store = MessageStore::new();
        store.append(Message::joined("Alice"));
        let own_join = store.append(Message::joined("Bob"));
        store.append(Message::text("Alice", "hi Bob"));

        let replayed: Vec<_> = store.replay(Some(own_join)).collect();

        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].sender, "Alice");
        assert_eq!(replayed[1].text, "hi Bob");
        assert_eq!(store.replay(None).count(), 3);
    }
}
