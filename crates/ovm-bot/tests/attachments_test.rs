mod common;

use common::*;
use ovm_bot::attachments::{
    AttachmentIngestor, IMAGE_ANALYSIS_PREFIX, VISION_FAILED, VISION_REJECTED,
};
use ovm_bot::AttachmentRef;
use ovm_persist::Role;
use std::sync::Arc;

fn ingestor(describer: Arc<StubDescriber>) -> AttachmentIngestor {
    AttachmentIngestor::new(
        describer,
        vec![".txt".to_string(), ".log".to_string(), ".json".to_string()],
    )
}

#[tokio::test]
async fn test_image_becomes_analysis_entry() {
    let describer = StubDescriber::new(DescriberMode::Describe("A stack trace in a console".to_string()));
    let channel = FakeChannel::new();
    
    let entries = ingestor(describer.clone())
        .ingest(&channel, &[image("crash.png")])
        .await;
    
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].role, Role::User);
    assert_eq!(
        entries[0].content,
        format!("{}A stack trace in a console", IMAGE_ANALYSIS_PREFIX)
    );
    assert!(channel.sent().is_empty());
    assert_eq!(describer.calls(), 1);
}

#[tokio::test]
async fn test_vision_status_failure_notice() {
    let channel = FakeChannel::new();
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Rejected))
        .ingest(&channel, &[image("crash.png")])
        .await;
    
    assert!(entries.is_empty());
    assert_eq!(channel.sent(), vec![VISION_REJECTED.to_string()]);
}

#[tokio::test]
async fn test_vision_transport_failure_notice() {
    let channel = FakeChannel::new();
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Unreachable))
        .ingest(&channel, &[image("crash.png")])
        .await;
    
    assert!(entries.is_empty());
    assert_eq!(channel.sent(), vec![VISION_FAILED.to_string()]);
}

#[tokio::test]
async fn test_text_file_is_fetched() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/latest.log")
        .with_status(200)
        .with_body("java.lang.OutOfMemoryError")
        .create_async()
        .await;
    
    let channel = FakeChannel::new();
    let attachment = file_at("latest.log", format!("{}/latest.log", server.url()));
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Unreachable))
        .ingest(&channel, &[attachment])
        .await;
    
    mock.assert_async().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, "[File: latest.log]\njava.lang.OutOfMemoryError");
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_text_file_non_200_notice() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/config.json")
        .with_status(404)
        .create_async()
        .await;
    
    let channel = FakeChannel::new();
    let attachment = file_at("config.json", format!("{}/config.json", server.url()));
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Unreachable))
        .ingest(&channel, &[attachment])
        .await;
    
    assert!(entries.is_empty());
    assert_eq!(channel.sent(), vec!["❌ Failed to fetch config.json.".to_string()]);
}

#[tokio::test]
async fn test_text_file_transport_error_notice() {
    let channel = FakeChannel::new();
    // nothing listens on port 1
    let attachment = file_at("notes.txt", "http://127.0.0.1:1/notes.txt".to_string());
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Unreachable))
        .ingest(&channel, &[attachment])
        .await;
    
    assert!(entries.is_empty());
    assert_eq!(channel.sent(), vec!["⚠️ Could not process notes.txt.".to_string()]);
}

#[tokio::test]
async fn test_unsupported_attachment_is_skipped() {
    let channel = FakeChannel::new();
    let describer = StubDescriber::new(DescriberMode::Describe("unused".to_string()));
    let archive = AttachmentRef {
        filename: "world.zip".to_string(),
        url: "http://127.0.0.1:1/world.zip".to_string(),
        content_type: Some("application/zip".to_string()),
    };
    
    let entries = ingestor(describer.clone()).ingest(&channel, &[archive]).await;
    
    assert!(entries.is_empty());
    assert!(channel.sent().is_empty());
    assert_eq!(describer.calls(), 0);
}

#[tokio::test]
async fn test_failures_do_not_stop_later_attachments() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/server.log")
        .with_status(200)
        .with_body("Done (3.2s)!")
        .create_async()
        .await;
    
    let channel = FakeChannel::new();
    let attachments = vec![
        image("first.png"),
        file_at("server.log", format!("{}/server.log", server.url())),
    ];
    
    let entries = ingestor(StubDescriber::new(DescriberMode::Rejected))
        .ingest(&channel, &attachments)
        .await;
    
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, "[File: server.log]\nDone (3.2s)!");
    assert_eq!(channel.sent(), vec![VISION_REJECTED.to_string()]);
}
