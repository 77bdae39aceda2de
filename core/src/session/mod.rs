//! Conversation state
//!
//! An append-only log of exchanged messages, owned exclusively by the
//! turn-cycle controller. Backends only ever see a bounded read-only suffix.

use crate::llm::ChatMessage;

/// Ordered, append-only conversation log.
///
/// Messages are appended in strict chronological order and never reordered
/// or mutated after append.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the log.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The most recent `k` messages, oldest first (fewer if history is
    /// shorter). Used by backends that replay history explicitly.
    pub fn last_n(&self, k: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(k);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(ChatMessage::user("first"));
        log.append(ChatMessage::assistant("reply one", "a1"));
        log.append(ChatMessage::user("second"));

        assert_eq!(log.len(), 3);
        let all = log.last_n(10);
        assert_eq!(all[0].content, "first");
        assert_eq!(all[1].content, "reply one");
        assert_eq!(all[2].content, "second");
    }

    #[test]
    fn test_last_n_returns_suffix_oldest_first() {
        let mut log = ConversationLog::new();
        for i in 0..6 {
            log.append(ChatMessage::user(format!("msg {}", i)));
        }

        let window = log.last_n(4);
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].content, "msg 2");
        assert_eq!(window[3].content, "msg 5");
    }

    #[test]
    fn test_last_n_shorter_history() {
        let mut log = ConversationLog::new();
        log.append(ChatMessage::assistant("only", "a1"));

        let window = log.last_n(4);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].role, MessageRole::Assistant);
    }

    #[test]
    fn test_empty_log() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert!(log.last_n(4).is_empty());
    }
}
