//! Console transport — prints outbound messages to stdout.
//!
//! Used by the binary for local operation: every "send" becomes a printed
//! line, and sent messages are recorded so a later `/reply` can quote them
//! the way a real chat client would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::TransportError;
use crate::pipeline::types::InboundMessage;
use crate::transport::{Attachment, MessageHandle, Transport};

/// Transport that writes to stdout and remembers what it sent.
#[derive(Default)]
pub struct ConsoleTransport {
    sent: RwLock<HashMap<String, String>>,
    counter: AtomicUsize,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of a previously sent message, for quoting in replies.
    pub async fn sent_text(&self, message_id: &str) -> Option<String> {
        self.sent.read().await.get(message_id).cloned()
    }

    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("sent-{n}")
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_text(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageHandle, TransportError> {
        let id = self.next_id();
        println!("→ [{channel_id}] ({id}) {text}");
        self.sent.write().await.insert(id.clone(), text.to_string());
        Ok(MessageHandle { id })
    }

    async fn send_attachment(
        &self,
        channel_id: &str,
        attachment: &Attachment,
    ) -> Result<MessageHandle, TransportError> {
        let id = self.next_id();
        println!(
            "→ [{channel_id}] ({id}) <attachment {} — {} bytes>",
            attachment.mime_type,
            attachment.data.len()
        );
        Ok(MessageHandle { id })
    }

    async fn download_attachment(
        &self,
        message: &InboundMessage,
    ) -> Result<Attachment, TransportError> {
        // Console input has no media to fetch.
        Err(TransportError::DownloadFailed {
            message_id: message.id.clone(),
            reason: "console transport carries no media".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn send_records_text_under_handle_id() {
        let transport = ConsoleTransport::new();
        let handle = transport.send_text("it-group", "hello").await.unwrap();
        assert_eq!(transport.sent_text(&handle.id).await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn handles_are_distinct() {
        let transport = ConsoleTransport::new();
        let a = transport.send_text("x", "one").await.unwrap();
        let b = transport.send_text("x", "two").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn download_always_fails() {
        let transport = ConsoleTransport::new();
        let msg = InboundMessage {
            id: "m1".into(),
            channel_id: "ops".into(),
            sender: "alice".into(),
            text: "photo".into(),
            has_attachment: true,
            quoted: None,
            received_at: Utc::now(),
        };
        assert!(matches!(
            transport.download_attachment(&msg).await,
            Err(TransportError::DownloadFailed { .. })
        ));
    }
}
