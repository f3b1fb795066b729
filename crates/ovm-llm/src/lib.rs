pub mod config;
pub mod fallback;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod traits;
pub mod types;
pub mod vision;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};

pub use config::{ClientFactory, ModelDescriptor};
pub use fallback::{FallbackDispatcher, UNAVAILABLE_MESSAGE};
pub use openai::{ApiStatusError, OpenAIClient};
pub use provider::{Backend, CompletionProvider};
pub use types::{Content, ContentPart, ImageUrl, Message};
pub use vision::{ImageDescriber, VisionBackend};
