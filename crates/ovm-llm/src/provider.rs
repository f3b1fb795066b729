use crate::config::{ClientFactory, ModelDescriptor};
use crate::traits::{ChatClient, ChatRequest};
use crate::types::Message;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can turn a message history into one reply.
///
/// The fallback dispatcher only sees this trait, so backends of different
/// kinds (HTTP, local, stubs in tests) can share one priority list.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Label used in logs
    fn name(&self) -> &str;
    
    async fn complete(&self, messages: Vec<Message>) -> Result<String>;
}

/// A configured remote completion service
pub struct Backend {
    name: String,
    model: String,
    client: Arc<dyn ChatClient>,
}

impl Backend {
    pub fn new(name: impl Into<String>, model: impl Into<String>, client: Arc<dyn ChatClient>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            client,
        }
    }
    
    pub fn from_descriptor(descriptor: &ModelDescriptor) -> Result<Self> {
        let client = ClientFactory::create_chat_client(descriptor)?;
        Ok(Self::new(&descriptor.name, &descriptor.model, client))
    }
}

#[async_trait]
impl CompletionProvider for Backend {
    fn name(&self) -> &str {
        &self.name
    }
    
    async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest::new(&self.model, messages);
        let response = self.client.chat(request).await?;
        
        // A 2xx without a message body is as useless as a failure
        response
            .content
            .ok_or_else(|| anyhow!("{} returned no content", self.name))
    }
}
