//! Confirmation tracker — closes the loop on forwarded tasks.
//!
//! One table, keyed by forwarded-message id, checked once per inbound
//! message by the single stable pipeline handler. No per-task listeners are
//! ever registered. The tracker is the sole owner of the table.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::keywords::ConfirmationPhrases;
use crate::pipeline::types::{CompletionNotice, InboundMessage, PendingTask};

/// Detects confirmation replies to forwarded tasks.
pub struct ConfirmationTracker {
    phrases: ConfirmationPhrases,
    task_marker: String,
    pending: RwLock<HashMap<String, PendingTask>>,
}

impl ConfirmationTracker {
    pub fn new(phrases: ConfirmationPhrases, task_marker: String) -> Self {
        Self {
            phrases,
            task_marker,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Record a forwarded task, keyed by its forwarded-message id.
    pub async fn register(&self, task: PendingTask) {
        debug!(
            forwarded_id = %task.forwarded_id,
            category = %task.category,
            origin = %task.origin_channel,
            "Tracking forwarded task"
        );
        self.pending
            .write()
            .await
            .insert(task.forwarded_id.clone(), task);
    }

    /// Check an inbound message for a task confirmation.
    ///
    /// Triggers only when the message quotes a prior message whose text
    /// begins with the task marker AND the reply contains a confirmation
    /// phrase. A confirmed task is removed from the table (terminal state).
    /// Anything else is silently ignored — most replies are ordinary
    /// conversation.
    pub async fn on_incoming(&self, message: &InboundMessage) -> Option<CompletionNotice> {
        let quoted = message.quoted.as_ref()?;
        if !quoted.text.starts_with(&self.task_marker) {
            return None;
        }
        if !self.phrases.matches(&message.text) {
            debug!(
                id = %message.id,
                "Reply quotes a task but carries no confirmation phrase, ignoring"
            );
            return None;
        }

        let task = self.pending.write().await.remove(&quoted.id);
        let (task_text, origin_channel) = match task {
            Some(task) => (task.task_text, Some(task.origin_channel)),
            // Task not in the table (e.g. forwarded before a restart):
            // recover the text from the quoted body itself.
            None => (self.strip_marker(&quoted.text), None),
        };

        info!(
            id = %message.id,
            channel = %message.channel_id,
            task = %task_text,
            "Task confirmed"
        );

        Some(CompletionNotice {
            task_text,
            origin_channel,
            confirmed_in: message.channel_id.clone(),
            confirmed_by: message.sender.clone(),
            confirmed_at: Utc::now(),
        })
    }

    /// Snapshot of tasks still awaiting confirmation, oldest first.
    pub async fn pending(&self) -> Vec<PendingTask> {
        let mut tasks: Vec<PendingTask> = self.pending.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Number of tasks still awaiting confirmation.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Drop the marker prefix and bold markers from a forwarded task body.
    fn strip_marker(&self, forwarded_body: &str) -> String {
        forwarded_body
            .strip_prefix(&self.task_marker)
            .unwrap_or(forwarded_body)
            .trim()
            .trim_matches('*')
            .trim()
            .to_string()
    }
}
