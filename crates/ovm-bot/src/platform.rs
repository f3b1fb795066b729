// Chat-platform capabilities the bot core depends on.
//
// The Discord adapter implements these over serenity; tests implement them
// with recorders. Nothing in the core touches serenity types directly.

use anyhow::Result;
use async_trait::async_trait;
use ovm_persist::ThreadId;

/// The thread a message arrived in
#[async_trait]
pub trait ThreadChannel: Send + Sync {
    /// Post one message (callers keep it under the platform limit)
    async fn send(&self, text: &str) -> Result<()>;
    
    /// Lock the thread against further replies
    async fn lock(&self) -> Result<()>;
}

/// The server whose display name the presence updater rewrites
#[async_trait]
pub trait GuildHandle: Send + Sync {
    async fn rename(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub display_name: String,
    /// Holds the administrator permission in the guild
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
}

impl AttachmentRef {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// A received message, already resolved against its channel
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel id; equals the thread id when the channel is a thread
    pub thread_id: ThreadId,
    pub parent_id: Option<u64>,
    pub is_public_thread: bool,
    /// Creator of the thread, if the channel is one
    pub thread_owner_id: Option<u64>,
    pub author: Author,
    pub content: String,
    pub attachments: Vec<AttachmentRef>,
}

impl IncomingMessage {
    /// Whether the author may wipe this thread's history
    pub fn author_may_reset(&self) -> bool {
        self.thread_owner_id == Some(self.author.id) || self.author.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(owner: Option<u64>, author_id: u64, is_admin: bool) -> IncomingMessage {
        IncomingMessage {
            thread_id: ThreadId(1),
            parent_id: Some(10),
            is_public_thread: true,
            thread_owner_id: owner,
            author: Author {
                id: author_id,
                display_name: "member".to_string(),
                is_admin,
            },
            content: "!forget".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_creator_may_reset() {
        assert!(message(Some(5), 5, false).author_may_reset());
    }

    #[test]
    fn test_admin_may_reset() {
        assert!(message(Some(5), 6, true).author_may_reset());
    }

    #[test]
    fn test_stranger_may_not_reset() {
        assert!(!message(Some(5), 6, false).author_may_reset());
        assert!(!message(None, 6, false).author_may_reset());
    }

    #[test]
    fn test_image_detection_uses_content_type() {
        let image = AttachmentRef {
            filename: "shot.png".to_string(),
            url: "https://cdn/x".to_string(),
            content_type: Some("image/png".to_string()),
        };
        let unknown = AttachmentRef {
            content_type: None,
            ..image.clone()
        };
        assert!(image.is_image());
        assert!(!unknown.is_image());
    }
}
