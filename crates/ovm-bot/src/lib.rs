//! OneVM support bot: answers in Discord forum threads with an ordered set of
//! OpenAI-compatible models and keeps per-thread history on disk.

pub mod attachments;
pub mod config;
pub mod discord;
pub mod locks;
pub mod moderator;
pub mod pipeline;
pub mod platform;
pub mod presence;

pub use attachments::AttachmentIngestor;
pub use config::Config;
pub use pipeline::{Outcome, SupportPipeline};
pub use platform::{AttachmentRef, Author, GuildHandle, IncomingMessage, ThreadChannel};
pub use presence::PresenceUpdater;
