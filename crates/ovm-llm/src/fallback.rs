use crate::prompts::{render_system_prompt, SUPPORT_SYSTEM_PROMPT_TEMPLATE};
use crate::provider::CompletionProvider;
use crate::types::Message;
use std::sync::Arc;

/// Reply used when every backend failed
pub const UNAVAILABLE_MESSAGE: &str = "⚠️ All models are currently unavailable. Please try again later.";

/// Ordered fallback over completion providers.
///
/// Providers are tried strictly in the order given. The first success wins and
/// later providers are never called. Failures are logged and skipped, never
/// retried.
pub struct FallbackDispatcher {
    providers: Vec<Arc<dyn CompletionProvider>>,
    system_prompt_template: String,
}

impl FallbackDispatcher {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            providers,
            system_prompt_template: SUPPORT_SYSTEM_PROMPT_TEMPLATE.to_string(),
        }
    }
    
    pub fn with_system_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.system_prompt_template = template.into();
        self
    }
    
    /// Persona prompt for one user
    pub fn system_prompt(&self, username: &str) -> Message {
        Message::system(render_system_prompt(&self.system_prompt_template, username))
    }
    
    /// Produce a reply for `history`. Never fails: exhaustion yields
    /// [`UNAVAILABLE_MESSAGE`].
    pub async fn dispatch(&self, history: &[Message], username: &str) -> String {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(self.system_prompt(username));
        messages.extend_from_slice(history);
        
        for provider in &self.providers {
            match provider.complete(messages.clone()).await {
                Ok(content) => {
                    tracing::debug!(backend = %provider.name(), "Backend answered");
                    return content;
                }
                Err(e) => {
                    tracing::warn!(backend = %provider.name(), error = %e, "Backend failed, trying next");
                }
            }
        }
        
        tracing::error!(backends = self.providers.len(), "All backends failed");
        UNAVAILABLE_MESSAGE.to_string()
    }
}
