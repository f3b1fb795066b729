use crate::config::{ClientFactory, ModelDescriptor};
use crate::prompts::{VISION_SYSTEM_PROMPT, VISION_USER_INSTRUCTION};
use crate::traits::{ChatClient, ChatRequest};
use crate::types::{Content, ContentPart, Message};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Turns an image reference into a textual description
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, image_url: &str) -> Result<String>;
}

/// Image-description backend speaking the chat-completions protocol with a
/// multimodal user message.
pub struct VisionBackend {
    name: String,
    model: String,
    client: Arc<dyn ChatClient>,
}

impl VisionBackend {
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
    
    /// System instruction + `[text, image_url]` user message
    pub fn build_messages(image_url: &str) -> Vec<Message> {
        vec![
            Message::system(VISION_SYSTEM_PROMPT),
            Message::user(Content::Parts(vec![
                ContentPart::text(VISION_USER_INSTRUCTION),
                ContentPart::image_url(image_url),
            ])),
        ]
    }
}

#[async_trait]
impl ImageDescriber for VisionBackend {
    async fn describe(&self, image_url: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model, Self::build_messages(image_url));
        let response = self.client.chat(request).await?;
        
        response
            .content
            .ok_or_else(|| anyhow!("{} returned no description", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_messages_shape() {
        let messages = VisionBackend::build_messages("https://cdn.example/crash.png");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), "system");
        match messages[1].content() {
            Content::Parts(parts) => {
                assert_eq!(parts[0], ContentPart::text("Describe this image"));
                assert_eq!(parts[1], ContentPart::image_url("https://cdn.example/crash.png"));
            }
            other => panic!("expected multipart content, got {:?}", other),
        }
    }
}
