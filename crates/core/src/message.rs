//! Message and History domain types.
//!
//! A `History` is the role-tagged transcript sent to the model. Every split
//! or evaluation starts from a fresh, empty history and owns it until the
//! item is done; nothing carries over between items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller (message text or evaluation prompt)
    User,
    /// The model
    Assistant,
    /// Fixed instructions
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

/// An ordered transcript of user and assistant turns for one item.
///
/// The system instruction is not stored here; processors prepend it when
/// building each request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Build the full request transcript: `system` followed by every turn.
    pub fn with_system(&self, system: &str) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        out.push(Message::system(system));
        out.extend(self.messages.iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn history_starts_empty() {
        let history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn with_system_prepends_instruction() {
        let mut history = History::new();
        history.push(Message::user("first"));
        history.push(Message::assistant("reply"));

        let transcript = history.with_system("be terse");
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, Role::System);
        assert_eq!(transcript[0].content, "be terse");
        assert_eq!(transcript[1].role, Role::User);
        assert_eq!(transcript[2].role, Role::Assistant);
        // The stored history is untouched.
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::System.as_str(), "system");
    }
}
