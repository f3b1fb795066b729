use serde::{Deserialize, Serialize};
use std::fmt;

/// Discord thread (channel) id.
///
/// Always a `u64` in memory; serde_json writes map keys of this type as their
/// decimal string, so the persisted record is keyed by `"1234"` while lookups
/// never deal with strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ThreadId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One role-tagged turn. Content is always text; attachments are converted
/// before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
    
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
    
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
    
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
    
    /// Length in characters, the unit of the context cap
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

// Conversion: HistoryEntry → ovm_llm::Message
impl From<HistoryEntry> for ovm_llm::Message {
    fn from(entry: HistoryEntry) -> Self {
        match entry.role {
            Role::User => ovm_llm::Message::user(entry.content),
            Role::Assistant => ovm_llm::Message::assistant(entry.content),
            Role::System => ovm_llm::Message::system(entry.content),
        }
    }
}
