//! Router — forwards matched messages and announces completions.
//!
//! Each matched category resolves to a destination channel. The forwarded
//! body carries the task-marker prefix so confirmation replies can later be
//! recognized. Per-destination failures are logged and tolerated.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::pipeline::types::{CompletionNotice, ForwardResult, InboundMessage};
use crate::transport::{Attachment, Transport};

/// Maps matched categories to destination channels and dispatches forwards.
pub struct Router {
    transport: Arc<dyn Transport>,
    routes: BTreeMap<String, String>,
    task_marker: String,
    audit_channel: String,
    notify_origin: bool,
}

impl Router {
    pub fn new(
        transport: Arc<dyn Transport>,
        routes: BTreeMap<String, String>,
        task_marker: String,
        audit_channel: String,
        notify_origin: bool,
    ) -> Self {
        Self {
            transport,
            routes,
            task_marker,
            audit_channel,
            notify_origin,
        }
    }

    /// Build the forwarded task body: marker prefix, blank line, bold text.
    pub fn forward_body(&self, text: &str) -> String {
        format!("{}\n\n*{}*", self.task_marker, text)
    }

    /// Forward a message to the destination of every matched category.
    ///
    /// Issues exactly one forward attempt per routed category; a transport
    /// failure on one destination is recorded in its `ForwardResult` and the
    /// remaining destinations are still attempted. When the message carries
    /// media, it is downloaded once and re-sent after each text forward.
    pub async fn route(
        &self,
        message: &InboundMessage,
        categories: &BTreeSet<String>,
    ) -> Vec<ForwardResult> {
        if categories.is_empty() {
            return Vec::new();
        }

        let attachment = self.fetch_attachment(message).await;
        let body = self.forward_body(&message.text);
        let mut results = Vec::with_capacity(categories.len());

        for category in categories {
            let Some(destination) = self.routes.get(category) else {
                warn!(category = %category, "No route for matched category, skipping");
                continue;
            };

            let outcome = self.transport.send_text(destination, &body).await;
            match &outcome {
                Ok(handle) => {
                    info!(
                        id = %message.id,
                        category = %category,
                        destination = %destination,
                        forwarded_id = %handle.id,
                        "Forwarded task"
                    );
                    if let Some(media) = &attachment
                        && let Err(e) = self.transport.send_attachment(destination, media).await
                    {
                        warn!(
                            id = %message.id,
                            destination = %destination,
                            error = %e,
                            "Attachment follow-up failed, text forward already delivered"
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        id = %message.id,
                        category = %category,
                        destination = %destination,
                        error = %e,
                        "Forward failed, continuing with remaining destinations"
                    );
                }
            }

            results.push(ForwardResult {
                category: category.clone(),
                destination: destination.clone(),
                outcome,
            });
        }

        results
    }

    /// Send a completion notice to the audit channel and, when configured,
    /// back to the task's origin channel. Returns the delivery count.
    pub async fn announce_completion(&self, notice: &CompletionNotice) -> usize {
        let body = notice.render();
        let mut targets = vec![self.audit_channel.clone()];
        if self.notify_origin
            && let Some(origin) = &notice.origin_channel
            && origin != &self.audit_channel
        {
            targets.push(origin.clone());
        }

        let mut delivered = 0;
        for channel in &targets {
            match self.transport.send_text(channel, &body).await {
                Ok(_) => {
                    info!(channel = %channel, task = %notice.task_text, "Completion notice sent");
                    delivered += 1;
                }
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Completion notice failed");
                }
            }
        }
        delivered
    }

    async fn fetch_attachment(&self, message: &InboundMessage) -> Option<Attachment> {
        if !message.has_attachment {
            return None;
        }
        match self.transport.download_attachment(message).await {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!(
                    id = %message.id,
                    error = %e,
                    "Attachment download failed, forwarding text only"
                );
                None
            }
        }
    }
}
