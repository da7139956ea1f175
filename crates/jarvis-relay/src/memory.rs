//! Bounded per-session conversation memory
//!
//! Each session keeps a sliding window of its most recent turns. Appending at
//! capacity evicts the oldest turn. Reads hand out owned snapshots, never
//! references into the store.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Conversation role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Window size used when none is configured
pub const DEFAULT_MAX_MESSAGES: usize = 15;

/// Synchronized storage of recent turns per session.
///
/// None of the operations can fail. `get_recent` on an unknown session returns
/// an empty vector and does not create the session; `clear` on an unknown
/// session does nothing.
pub trait MemoryStore: Send + Sync {
    fn add(&self, session_id: &str, role: Role, content: &str);
    fn get_recent(&self, session_id: &str) -> Vec<Message>;
    fn clear(&self, session_id: &str);
    fn session_count(&self) -> usize;
    fn max_messages(&self) -> usize;
}

/// Pushes onto a window and trims it back to `max_messages` from the front.
fn push_bounded(window: &mut VecDeque<Message>, message: Message, max_messages: usize) {
    window.push_back(message);
    while window.len() > max_messages {
        window.pop_front();
    }
}

/// Memory store guarded by one global lock.
///
/// Operations on different sessions are serialized as well. The lock is held
/// only for the in-memory mutation.
pub struct ConversationMemory {
    max_messages: usize,
    sessions: Mutex<HashMap<String, VecDeque<Message>>>,
}

impl ConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    // Every mutation is a single push/pop/remove, so a poisoned map is still consistent.
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Message>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl MemoryStore for ConversationMemory {
    fn add(&self, session_id: &str, role: Role, content: &str) {
        let message = Message::new(role, content);
        let mut sessions = self.sessions();
        let window = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.max_messages));
        push_bounded(window, message, self.max_messages);
    }

    fn get_recent(&self, session_id: &str) -> Vec<Message> {
        match self.sessions().get(session_id) {
            Some(window) => window.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn clear(&self, session_id: &str) {
        self.sessions().remove(session_id);
    }

    fn session_count(&self) -> usize {
        self.sessions().len()
    }

    fn max_messages(&self) -> usize {
        self.max_messages
    }
}

/// Memory store sharded by session id.
///
/// Each session is still linearizable; unrelated sessions mostly land on
/// different shards and do not contend.
pub struct ShardedConversationMemory {
    max_messages: usize,
    sessions: DashMap<String, VecDeque<Message>>,
}

impl ShardedConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            sessions: DashMap::new(),
        }
    }
}

impl Default for ShardedConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl MemoryStore for ShardedConversationMemory {
    fn add(&self, session_id: &str, role: Role, content: &str) {
        let message = Message::new(role, content);
        let mut window = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.max_messages));
        push_bounded(&mut window, message, self.max_messages);
    }

    fn get_recent(&self, session_id: &str) -> Vec<Message> {
        match self.sessions.get(session_id) {
            Some(window) => window.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn clear(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn max_messages(&self) -> usize {
        self.max_messages
    }
}
