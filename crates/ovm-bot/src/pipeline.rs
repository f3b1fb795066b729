use anyhow::Result;
use ovm_llm::{Backend, CompletionProvider, FallbackDispatcher, Message, VisionBackend};
use ovm_persist::{HistoryEntry, HistoryStore, ThreadId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::attachments::AttachmentIngestor;
use crate::config::Config;
use crate::locks::ThreadLocks;
use crate::moderator::{
    forget_confirmation, split_reply, Command, ContextCap, DISCORD_MESSAGE_LIMIT, FORGET_DENIED,
    STARTUP_REFUSAL, TOKEN_LIMIT_WARNING,
};
use crate::platform::{IncomingMessage, ThreadChannel};

/// What the pipeline did with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Startup,
    /// Not in a monitored forum thread
    Ignored,
    Quoted,
    Forgotten,
    ForgetDenied,
    /// Context cap exceeded; the thread was warned and locked
    Locked,
    Replied { chunks: usize },
}

pub struct SupportPipeline {
    store: Arc<dyn HistoryStore>,
    dispatcher: FallbackDispatcher,
    ingestor: AttachmentIngestor,
    cap: ContextCap,
    forums: Vec<u64>,
    locks: ThreadLocks,
}

impl SupportPipeline {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        dispatcher: FallbackDispatcher,
        ingestor: AttachmentIngestor,
        cap: ContextCap,
        forums: Vec<u64>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            ingestor,
            cap,
            forums,
            locks: ThreadLocks::new(),
        }
    }
    
    /// Wire backends, vision and moderation settings from configuration
    pub fn from_config(config: &Config, store: Arc<dyn HistoryStore>) -> Result<Self> {
        let mut providers: Vec<Arc<dyn CompletionProvider>> = Vec::new();
        for descriptor in config.backend_descriptors()? {
            info!(backend = %descriptor.name, model = %descriptor.model, "Registering completion backend");
            providers.push(Arc::new(Backend::from_descriptor(&descriptor)?));
        }
        
        let mut dispatcher = FallbackDispatcher::new(providers);
        if let Some(template) = &config.prompt.system_template {
            dispatcher = dispatcher.with_system_prompt_template(template.clone());
        }
        
        let vision = VisionBackend::from_descriptor(&config.vision.descriptor()?)?;
        let ingestor = AttachmentIngestor::new(
            Arc::new(vision),
            config.attachments.text_extensions.clone(),
        );
        
        Ok(Self::new(
            store,
            dispatcher,
            ingestor,
            ContextCap::new(config.history.max_chars),
            config.discord.monitored_forums(),
        ))
    }
    
    /// Public thread whose parent is one of the monitored forums
    pub fn is_monitored(&self, message: &IncomingMessage) -> bool {
        message.is_public_thread
            && message
                .parent_id
                .is_some_and(|parent| self.forums.contains(&parent))
    }
    
    /// Handle one message. Never fails; every problem is logged or reported
    /// to the thread.
    pub async fn handle(&self, channel: &dyn ThreadChannel, message: &IncomingMessage) -> Outcome {
        let command = Command::parse(&message.content);
        
        if command == Command::Startup {
            say(channel, STARTUP_REFUSAL).await;
            return Outcome::Startup;
        }
        
        if !self.is_monitored(message) {
            return Outcome::Ignored;
        }
        
        if command == Command::Quoted {
            debug!(thread_id = %message.thread_id, "Ignoring quoted message");
            return Outcome::Quoted;
        }
        
        let thread_id = message.thread_id;
        let _guard = self.locks.acquire(thread_id).await;
        
        if command == Command::Forget {
            return self.forget(channel, message).await;
        }
        
        self.record(thread_id, HistoryEntry::user(message.content.as_str())).await;
        
        for entry in self.ingestor.ingest(channel, &message.attachments).await {
            self.record(thread_id, entry).await;
        }
        
        let total = self.store.total_chars(thread_id).await;
        if self.cap.is_exceeded_by(total) {
            warn!(thread_id = %thread_id, total_chars = total, max_chars = self.cap.max_chars, "Context cap exceeded, locking thread");
            say(channel, TOKEN_LIMIT_WARNING).await;
            if let Err(e) = channel.lock().await {
                error!(thread_id = %thread_id, error = %e, "Failed to lock thread");
            }
            return Outcome::Locked;
        }
        
        let history: Vec<Message> = self
            .store
            .get(thread_id)
            .await
            .into_iter()
            .map(Message::from)
            .collect();
        
        let reply = self.dispatcher.dispatch(&history, &message.author.display_name).await;
        self.record(thread_id, HistoryEntry::assistant(reply.as_str())).await;
        
        let chunks = split_reply(&reply, DISCORD_MESSAGE_LIMIT);
        for chunk in &chunks {
            say(channel, chunk).await;
        }
        
        Outcome::Replied { chunks: chunks.len() }
    }
    
    async fn forget(&self, channel: &dyn ThreadChannel, message: &IncomingMessage) -> Outcome {
        let thread_id = message.thread_id;
        
        if !message.author_may_reset() {
            info!(thread_id = %thread_id, author_id = message.author.id, "Refused history purge");
            say(channel, FORGET_DENIED).await;
            return Outcome::ForgetDenied;
        }
        
        if let Err(e) = self.store.reset(thread_id).await {
            error!(thread_id = %thread_id, error = %e, "Failed to persist history purge");
        }
        info!(thread_id = %thread_id, author_id = message.author.id, "Thread history purged");
        say(channel, &forget_confirmation(&message.author.display_name)).await;
        Outcome::Forgotten
    }
    
    async fn record(&self, thread_id: ThreadId, entry: HistoryEntry) {
        if let Err(e) = self.store.append(thread_id, entry).await {
            error!(thread_id = %thread_id, error = %e, "Failed to persist history");
        }
    }
}

async fn say(channel: &dyn ThreadChannel, text: &str) {
    if let Err(e) = channel.send(text).await {
        warn!(error = %e, "Failed to send message");
    }
}
