mod client;

pub use client::{ApiStatusError, OpenAIClient};
