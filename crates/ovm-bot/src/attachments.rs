use ovm_llm::{ApiStatusError, ImageDescriber};
use ovm_persist::HistoryEntry;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::platform::{AttachmentRef, ThreadChannel};

pub const IMAGE_ANALYSIS_PREFIX: &str = "[Image Analysis]: ";

/// The vision backend answered with a non-success status
pub const VISION_REJECTED: &str = "⚠️ Vision model couldn’t process the image.";

/// The vision backend could not be reached or returned garbage
pub const VISION_FAILED: &str = "❌ An error occurred during image analysis.";

pub fn fetch_failed_notice(filename: &str) -> String {
    format!("❌ Failed to fetch {}.", filename)
}

pub fn unreadable_notice(filename: &str) -> String {
    format!("⚠️ Could not process {}.", filename)
}

pub struct AttachmentIngestor {
    vision: Arc<dyn ImageDescriber>,
    http: reqwest::Client,
    text_extensions: Vec<String>,
}

impl AttachmentIngestor {
    pub fn new(vision: Arc<dyn ImageDescriber>, text_extensions: Vec<String>) -> Self {
        Self {
            vision,
            http: reqwest::Client::new(),
            text_extensions,
        }
    }
    
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
    
    pub fn is_text_file(&self, filename: &str) -> bool {
        self.text_extensions
            .iter()
            .any(|ext| filename.ends_with(ext.as_str()))
    }
    
    /// Process every attachment independently, in order.
    ///
    /// Failures are reported to the thread and skipped; they never stop the
    /// remaining attachments.
    pub async fn ingest(
        &self,
        channel: &dyn ThreadChannel,
        attachments: &[AttachmentRef],
    ) -> Vec<HistoryEntry> {
        let mut entries = Vec::new();
        
        for attachment in attachments {
            let entry = if attachment.is_image() {
                self.describe_image(channel, attachment).await
            } else if self.is_text_file(&attachment.filename) {
                self.fetch_text(channel, attachment).await
            } else {
                debug!(filename = %attachment.filename, "Skipping unsupported attachment");
                None
            };
            entries.extend(entry);
        }
        
        entries
    }
    
    async fn describe_image(
        &self,
        channel: &dyn ThreadChannel,
        attachment: &AttachmentRef,
    ) -> Option<HistoryEntry> {
        match self.vision.describe(&attachment.url).await {
            Ok(description) => Some(HistoryEntry::user(format!(
                "{}{}",
                IMAGE_ANALYSIS_PREFIX, description
            ))),
            Err(e) => {
                warn!(filename = %attachment.filename, error = %e, "Image analysis failed");
                let notice = if e.downcast_ref::<ApiStatusError>().is_some() {
                    VISION_REJECTED
                } else {
                    VISION_FAILED
                };
                notify(channel, notice).await;
                None
            }
        }
    }
    
    async fn fetch_text(
        &self,
        channel: &dyn ThreadChannel,
        attachment: &AttachmentRef,
    ) -> Option<HistoryEntry> {
        let filename = &attachment.filename;
        
        match self.http.get(&attachment.url).send().await {
            Ok(response) if response.status() == StatusCode::OK => match response.text().await {
                Ok(body) => Some(HistoryEntry::user(format!("[File: {}]\n{}", filename, body))),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Failed to read attachment body");
                    notify(channel, &unreadable_notice(filename)).await;
                    None
                }
            },
            Ok(response) => {
                warn!(filename = %filename, status = %response.status(), "Attachment download rejected");
                notify(channel, &fetch_failed_notice(filename)).await;
                None
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "Attachment download failed");
                notify(channel, &unreadable_notice(filename)).await;
                None
            }
        }
    }
}

async fn notify(channel: &dyn ThreadChannel, text: &str) {
    if let Err(e) = channel.send(text).await {
        warn!(error = %e, "Failed to post attachment notice");
    }
}
