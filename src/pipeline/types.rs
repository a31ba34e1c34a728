//! Shared types for the relay pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::TransportError;
use crate::transport::MessageHandle;

// ── Inbound message ─────────────────────────────────────────────────

/// Unified inbound message delivered by the transport session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Transport-assigned message id.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Sender identifier (phone number, handle).
    pub sender: String,
    /// Message body text.
    pub text: String,
    /// Whether the message carries media the transport can download.
    pub has_attachment: bool,
    /// The message this one replies to, if it is a quoted reply.
    pub quoted: Option<QuotedMessage>,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

/// The quoted portion of a reply — enough to recognize bot-forwarded tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedMessage {
    /// Id of the quoted message.
    pub id: String,
    /// Body text of the quoted message.
    pub text: String,
}

// ── Routing results ─────────────────────────────────────────────────

/// One forward attempt issued by the router.
///
/// Failures stay embedded here rather than aborting the route: one broken
/// destination must not block the others.
#[derive(Debug)]
pub struct ForwardResult {
    /// Matched category that triggered the forward.
    pub category: String,
    /// Destination channel id.
    pub destination: String,
    /// Handle of the forwarded message, or the transport failure.
    pub outcome: Result<MessageHandle, TransportError>,
}

impl ForwardResult {
    /// True if the forward reached the transport.
    pub fn is_sent(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ── Pending tasks and completion ────────────────────────────────────

/// A forwarded task awaiting a confirmation reply.
///
/// Keyed by the forwarded message's transport-assigned id. Lifetime is
/// unbounded: a task stays pending until confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTask {
    /// Id of the forwarded message in the destination channel.
    pub forwarded_id: String,
    /// Channel the original message came from.
    pub origin_channel: String,
    /// Original message text, without the task marker.
    pub task_text: String,
    /// Category the task was routed under.
    pub category: String,
    /// When the forward was issued.
    pub created_at: DateTime<Utc>,
}

/// A recognized task confirmation, ready to be announced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionNotice {
    /// The original task text (marker stripped).
    pub task_text: String,
    /// Origin channel of the task, when the pending entry was still known.
    pub origin_channel: Option<String>,
    /// Channel the confirmation reply was posted in.
    pub confirmed_in: String,
    /// Who confirmed.
    pub confirmed_by: String,
    /// When the confirmation was recognized.
    pub confirmed_at: DateTime<Utc>,
}

impl CompletionNotice {
    /// Render the notice body sent to channels.
    pub fn render(&self) -> String {
        format!("Task *{}* has been completed.", self.task_text)
    }
}

// ── Processed message ───────────────────────────────────────────────

/// Record of everything the pipeline did with one inbound message.
#[derive(Debug)]
pub struct ProcessedMessage {
    /// The original inbound message.
    pub original: InboundMessage,
    /// Categories the message matched (empty when skipped or unmatched).
    pub matched: BTreeSet<String>,
    /// Forward attempts, one per matched category.
    pub forwards: Vec<ForwardResult>,
    /// Completion notice, when the message confirmed a pending task.
    pub completion: Option<CompletionNotice>,
    /// When processing completed.
    pub processed_at: DateTime<Utc>,
}

impl ProcessedMessage {
    /// Short disposition label for logging.
    pub fn label(&self) -> &'static str {
        match (&self.completion, self.forwards.is_empty()) {
            (Some(_), _) => "confirmed",
            (None, false) => "routed",
            (None, true) => "unmatched",
        }
    }
}
