//! Transport abstraction for message I/O.
//!
//! The relay never speaks a chat protocol itself — an external session owns
//! the connection and delivers inbound messages. This trait is the outbound
//! seam: send text or media to a channel, download an inbound attachment.

pub mod console;

pub use console::ConsoleTransport;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::pipeline::types::InboundMessage;

/// Opaque handle to a message the transport has sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    /// Transport-assigned message id.
    pub id: String,
}

/// An attachment payload, downloaded from or sent through the transport.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// MIME type, e.g. "image/jpeg".
    pub mime_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
    /// Original filename, if the source had one.
    pub filename: Option<String>,
}

/// Trait for transports — pure I/O, no routing logic.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message to a channel.
    async fn send_text(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageHandle, TransportError>;

    /// Send an attachment to a channel.
    async fn send_attachment(
        &self,
        channel_id: &str,
        attachment: &Attachment,
    ) -> Result<MessageHandle, TransportError>;

    /// Download the attachment carried by an inbound message.
    async fn download_attachment(
        &self,
        message: &InboundMessage,
    ) -> Result<Attachment, TransportError>;
}
