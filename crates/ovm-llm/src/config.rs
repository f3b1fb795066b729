// Static backend configuration and the factory that turns it into clients

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One remote completion service: where it lives, how to authenticate,
/// which model to ask for. Immutable once loaded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Human-readable label used in logs
    pub name: String,
    /// Full chat-completions URL, e.g. "https://api.groq.com/openai/v1/chat/completions"
    pub endpoint: String,
    pub api_key: String,
    /// Model identifier sent in the request body
    pub model: String,
}

impl ModelDescriptor {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

// Keep credentials out of logs
impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat client for an OpenAI-compatible descriptor
    pub fn create_chat_client(
        descriptor: &ModelDescriptor,
    ) -> Result<Arc<dyn crate::traits::ChatClient>> {
        let client = crate::openai::OpenAIClient::new(&descriptor.endpoint, &descriptor.api_key)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let descriptor = ModelDescriptor::new(
            "groq-llama",
            "https://api.groq.com/openai/v1/chat/completions",
            "gsk_secret",
            "llama-3.3-70b-versatile",
        );

        let rendered = format!("{:?}", descriptor);
        assert!(rendered.contains("groq-llama"));
        assert!(!rendered.contains("gsk_secret"));
    }

    #[test]
    fn test_factory_builds_client() {
        let descriptor = ModelDescriptor::new(
            "groq-llama",
            "https://api.groq.com/openai/v1/chat/completions",
            "gsk_secret",
            "llama-3.3-70b-versatile",
        );

        assert!(ClientFactory::create_chat_client(&descriptor).is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let descriptor = ModelDescriptor::new("a", "http://x", "k", "m");
        let json = serde_json::to_string(&descriptor).unwrap();
        let back: ModelDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(descriptor, back);
    }
}
