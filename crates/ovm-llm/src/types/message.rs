use serde::{Deserialize, Serialize};
use super::content::Content;

/// One chat turn, serialized exactly as chat-completions endpoints expect it:
/// `{"role": "...", "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: Content },
    User { content: Content },
    Assistant { content: Content },
}

impl Message {
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System { content: content.into() }
    }
    
    pub fn user(content: impl Into<Content>) -> Self {
        Self::User { content: content.into() }
    }
    
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::Assistant { content: content.into() }
    }
    
    /// Wire name of the role
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }
    
    pub fn content(&self) -> &Content {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content } => content,
        }
    }
}
