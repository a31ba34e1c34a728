//! End-to-end relay flow: config + keyword files on disk, a mock transport,
//! and the full forward → confirm → notice loop.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use task_relay::config::RelayConfig;
use task_relay::error::TransportError;
use task_relay::pipeline::MessageProcessor;
use task_relay::pipeline::types::{InboundMessage, QuotedMessage};
use task_relay::transport::{Attachment, MessageHandle, Transport};

/// Records every send; optionally fails for specific channels.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    fail_channels: HashSet<String>,
    counter: AtomicUsize,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, t)| t)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageHandle, TransportError> {
        if self.fail_channels.contains(channel_id) {
            return Err(TransportError::SendFailed {
                channel: channel_id.into(),
                reason: "injected failure".into(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.into(), text.into()));
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(MessageHandle {
            id: format!("fwd-{n}"),
        })
    }

    async fn send_attachment(
        &self,
        channel_id: &str,
        _attachment: &Attachment,
    ) -> Result<MessageHandle, TransportError> {
        self.send_text(channel_id, "<attachment>").await
    }

    async fn download_attachment(
        &self,
        message: &InboundMessage,
    ) -> Result<Attachment, TransportError> {
        Err(TransportError::DownloadFailed {
            message_id: message.id.clone(),
            reason: "no media in this fixture".into(),
        })
    }
}

/// Write keyword fixtures and build a validated config pointing at them.
fn fixture_config(dir: &Path) -> RelayConfig {
    let it = dir.join("keywords_it.txt");
    let man = dir.join("keywords_man.txt");
    let ama = dir.join("keywords_ama.txt"); // deliberately never written
    let confirm = dir.join("keywords_confirm.txt");
    std::fs::write(&it, "wifi\nprinter\nrouter\n").unwrap();
    std::fs::write(&man, "leak\nboiler\nbroken\n").unwrap();
    std::fs::write(&confirm, "task completed\nall done\n").unwrap();

    let config: RelayConfig = serde_json::from_value(serde_json::json!({
        "categories": {
            "it": { "keywords": it, "destination": "it-group" },
            "maintenance": { "keywords": man, "destination": "man-group" },
            "housekeeping": { "keywords": ama, "destination": "ama-group" }
        },
        "confirmation_phrases": confirm,
        "audit_channel": "ops-audit",
        "watch_channels": ["front-desk"]
    }))
    .unwrap();
    config.validate().unwrap();
    config
}

fn post(channel: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: format!("in-{}", text.len()),
        channel_id: channel.into(),
        sender: "reception".into(),
        text: text.into(),
        has_attachment: false,
        quoted: None,
        received_at: Utc::now(),
    }
}

#[tokio::test]
async fn forward_then_confirm_relays_completion_notice() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let processor = MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    // Keyword message in the watched channel forwards to the IT group
    let routed = processor.handle(post("front-desk", "the wifi is down")).await;
    assert_eq!(routed.label(), "routed");
    let forwarded = transport.sent_to("it-group");
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0], "New task received:\n\n*the wifi is down*");

    // Technician confirms by replying to the forwarded message
    let mut reply = post("it-group", "ok, task completed today");
    reply.quoted = Some(QuotedMessage {
        id: "fwd-0".into(),
        text: forwarded[0].clone(),
    });
    let confirmed = processor.handle(reply).await;

    let notice = confirmed.completion.expect("completion notice");
    assert_eq!(notice.task_text, "the wifi is down");
    assert!(processor.pending_tasks().await.is_empty());

    // Notice reaches the audit channel and the origin channel
    let audit = transport.sent_to("ops-audit");
    assert_eq!(audit, vec!["Task *the wifi is down* has been completed."]);
    let origin = transport.sent_to("front-desk");
    assert_eq!(origin.len(), 1);
}

#[tokio::test]
async fn missing_keyword_source_degrades_that_category_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let processor = MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    // "towels" would be a housekeeping keyword, but its source is missing
    let result = processor.handle(post("front-desk", "we need towels")).await;
    assert_eq!(result.label(), "unmatched");
    assert!(transport.sent().is_empty());

    // Other categories still work
    let result = processor.handle(post("front-desk", "boiler is broken")).await;
    assert_eq!(result.label(), "routed");
    assert_eq!(transport.sent_to("man-group").len(), 1);
}

#[tokio::test]
async fn one_broken_destination_does_not_block_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let transport = Arc::new(RecordingTransport {
        fail_channels: HashSet::from(["it-group".to_string()]),
        ..Default::default()
    });
    let processor = MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    // Matches both "wifi" (it) and "leak" (maintenance)
    let result = processor
        .handle(post("front-desk", "wifi down and a leak in 204"))
        .await;

    assert_eq!(result.forwards.len(), 2);
    assert_eq!(result.forwards.iter().filter(|f| f.is_sent()).count(), 1);
    assert_eq!(transport.sent_to("man-group").len(), 1);
    // Only the delivered forward is tracked
    assert_eq!(processor.pending_tasks().await.len(), 1);
}

#[tokio::test]
async fn ordinary_replies_to_tasks_are_silently_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let processor = MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    processor.handle(post("front-desk", "printer out of toner")).await;
    let forwarded = transport.sent_to("it-group");

    let mut reply = post("it-group", "on my way");
    reply.quoted = Some(QuotedMessage {
        id: "fwd-0".into(),
        text: forwarded[0].clone(),
    });
    let result = processor.handle(reply).await;

    assert!(result.completion.is_none());
    assert_eq!(processor.pending_tasks().await.len(), 1);
    assert!(transport.sent_to("ops-audit").is_empty());
}

#[tokio::test]
async fn unwatched_channel_chatter_is_not_routed() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let processor = MessageProcessor::from_config(&config, Arc::clone(&transport) as Arc<dyn Transport>);

    let result = processor.handle(post("it-group", "the wifi here is great")).await;
    assert_eq!(result.label(), "unmatched");
    assert!(transport.sent().is_empty());
}
