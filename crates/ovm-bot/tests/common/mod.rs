#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use ovm_bot::{AttachmentRef, Author, GuildHandle, IncomingMessage, ThreadChannel};
use ovm_llm::{ApiStatusError, CompletionProvider, ImageDescriber, Message};
use ovm_persist::ThreadId;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SUPPORT_FORUM: u64 = 100;
pub const STAFF_FORUM: u64 = 200;
pub const THREAD_OWNER: u64 = 7;

/// Records everything posted to a thread
#[derive(Default)]
pub struct FakeChannel {
    pub sent: Mutex<Vec<String>>,
    pub locked: AtomicBool,
    pub fail_lock: bool,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn unlockable() -> Self {
        Self {
            fail_lock: true,
            ..Self::default()
        }
    }
    
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
    
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThreadChannel for FakeChannel {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
    
    async fn lock(&self) -> Result<()> {
        if self.fail_lock {
            bail!("missing permission to manage threads");
        }
        self.locked.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Records renames; the first `fail_first` attempts fail
#[derive(Default)]
pub struct RecordingGuild {
    pub names: Mutex<Vec<String>>,
    pub attempts: AtomicUsize,
    pub fail_first: usize,
}

impl RecordingGuild {
    pub fn failing() -> Self {
        Self::failing_first(usize::MAX)
    }
    
    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Self::default()
        }
    }
    
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
    
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuildHandle for RecordingGuild {
    async fn rename(&self, name: &str) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            bail!("missing permission to manage guild");
        }
        self.names.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

/// Completion backend with a fixed answer (or failure), counting calls
pub struct StubProvider {
    name: String,
    reply: Option<String>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<Message>>,
}

impl StubProvider {
    pub fn ok(name: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        })
    }
    
    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply: None,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        })
    }
    
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
    
    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }
    
    async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        // a real backend suspends on the network; let other tasks run here
        tokio::task::yield_now().await;
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => bail!("{} is down", self.name),
        }
    }
}

pub enum DescriberMode {
    Describe(String),
    Rejected,
    Unreachable,
}

pub struct StubDescriber {
    mode: DescriberMode,
    pub calls: AtomicUsize,
}

impl StubDescriber {
    pub fn new(mode: DescriberMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }
    
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageDescriber for StubDescriber {
    async fn describe(&self, _image_url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            DescriberMode::Describe(text) => Ok(text.clone()),
            DescriberMode::Rejected => Err(ApiStatusError {
                status: StatusCode::BAD_REQUEST,
                body: "image too large".to_string(),
            }
            .into()),
            DescriberMode::Unreachable => bail!("connection refused"),
        }
    }
}

pub fn image(filename: &str) -> AttachmentRef {
    AttachmentRef {
        filename: filename.to_string(),
        url: format!("https://cdn.example/{}", filename),
        content_type: Some("image/png".to_string()),
    }
}

pub fn file_at(filename: &str, url: String) -> AttachmentRef {
    AttachmentRef {
        filename: filename.to_string(),
        url,
        content_type: Some("text/plain".to_string()),
    }
}

/// Message in a support-forum thread created by `THREAD_OWNER`
pub fn thread_message(thread: u64, author_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        thread_id: ThreadId(thread),
        parent_id: Some(SUPPORT_FORUM),
        is_public_thread: true,
        thread_owner_id: Some(THREAD_OWNER),
        author: Author {
            id: author_id,
            display_name: format!("user{}", author_id),
            is_admin: false,
        },
        content: content.to_string(),
        attachments: Vec::new(),
    }
}
