//! A single conversation: ordered messages plus free-form context.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
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

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<Map<String, Value>>,
}

/// Flattened view of a [`Message`] returned by history queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<&Message> for HistoryEntry {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
            timestamp: m.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub context: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(session_id: impl Into<String>, context: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            context,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn add_message(
        &mut self,
        role: Role,
        content: impl Into<String>,
        metadata: Option<Map<String, Value>>,
    ) {
        let now = Utc::now();
        self.messages.push(Message {
            role,
            content: content.into(),
            timestamp: now,
            metadata,
        });
        self.updated_at = now;
        debug!(session_id = %self.session_id, %role, "message added");
    }

    /// Last `limit` messages, oldest first. `None` and `Some(0)` both mean
    /// the whole history.
    pub fn history(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        let start = match limit {
            Some(n) if n > 0 => self.messages.len().saturating_sub(n),
            _ => 0,
        };
        self.messages[start..].iter().map(HistoryEntry::from).collect()
    }

    /// Drop every message. The session itself survives.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
        info!(session_id = %self.session_id, "session cleared");
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

    fn session_with(contents: &[&str]) -> ConversationSession {
        let mut s = ConversationSession::new("s1", Map::new());
        for (i, c) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            s.add_message(role, *c, None);
        }
        s
    }

    #[test]
    fn add_message_appends_and_touches() {
        let mut s = ConversationSession::new("s1", Map::new());
        let before = s.updated_at;
        s.add_message(Role::User, "hello", None);
        assert_eq!(s.len(), 1);
        assert_eq!(s.messages[0].role, Role::User);
        assert_eq!(s.messages[0].content, "hello");
        assert!(s.updated_at >= before);
    }

    #[test]
    fn history_limit_takes_newest() {
        let s = session_with(&["a", "b", "c"]);
        let h = s.history(Some(2));
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].content, "b");
        assert_eq!(h[1].content, "c");
        assert_eq!(h[1].role, Role::User);
    }

    #[test]
    fn history_zero_or_none_returns_all() {
        let s = session_with(&["a", "b", "c"]);
        assert_eq!(s.history(None).len(), 3);
        assert_eq!(s.history(Some(0)).len(), 3);
        assert_eq!(s.history(Some(10)).len(), 3);
    }

    #[test]
    fn history_timestamps_are_rfc3339() {
        let s = session_with(&["a"]);
        let ts = &s.history(None)[0].timestamp;
        assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
    }

    #[test]
    fn clear_keeps_session() {
        let mut s = session_with(&["a", "b"]);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.session_id, "s1");
    }

    #[test]
    fn role_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
