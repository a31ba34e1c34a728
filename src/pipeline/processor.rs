//! Message processor — runs every inbound message through the pipeline.
//!
//! Flow, per message and strictly sequential:
//! 1. Confirmation check — a reply quoting a forwarded task may close it
//! 2. Classification — keyword sets over the normalized token sequence
//! 3. Routing — one forward per matched category, pending tasks recorded
//!
//! Nothing in this pipeline is fatal: transport failures are logged and
//! embedded in the per-message record.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::RelayConfig;
use crate::keywords::{ConfirmationPhrases, KeywordStore};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::router::Router;
use crate::pipeline::tracker::ConfirmationTracker;
use crate::pipeline::types::{InboundMessage, PendingTask, ProcessedMessage};
use crate::transport::Transport;

/// Owns the full pipeline for one relay process. No ambient globals — every
/// collaborator is constructed here and passed explicitly.
pub struct MessageProcessor {
    classifier: Classifier,
    keywords: RwLock<KeywordStore>,
    keyword_sources: BTreeMap<String, PathBuf>,
    router: Router,
    tracker: ConfirmationTracker,
    watch_channels: Vec<String>,
}

impl MessageProcessor {
    /// Build the processor from a loaded config and a transport.
    ///
    /// Keyword and phrase sources are read here; unreadable sources degrade
    /// to empty sets rather than failing startup.
    pub fn from_config(config: &RelayConfig, transport: Arc<dyn Transport>) -> Self {
        let keyword_sources = config.keyword_sources();
        let keywords = KeywordStore::load(&keyword_sources);
        let phrases = ConfirmationPhrases::load(&config.confirmation_phrases);
        let router = Router::new(
            transport,
            config.routes(),
            config.task_marker.clone(),
            config.audit_channel.clone(),
            config.notify_origin,
        );
        let tracker = ConfirmationTracker::new(phrases, config.task_marker.clone());

        Self {
            classifier: Classifier::new(),
            keywords: RwLock::new(keywords),
            keyword_sources,
            router,
            tracker,
            watch_channels: config.watch_channels.clone(),
        }
    }

    /// Build a processor from already-constructed parts (tests, embedding).
    pub fn new(
        keywords: KeywordStore,
        router: Router,
        tracker: ConfirmationTracker,
        watch_channels: Vec<String>,
    ) -> Self {
        Self {
            classifier: Classifier::new(),
            keywords: RwLock::new(keywords),
            keyword_sources: BTreeMap::new(),
            router,
            tracker,
            watch_channels,
        }
    }

    /// Process one inbound message.
    pub async fn handle(&self, message: InboundMessage) -> ProcessedMessage {
        info!(
            id = %message.id,
            channel = %message.channel_id,
            sender = %message.sender,
            "Processing inbound message"
        );

        // Confirmation replies arrive in destination channels, so this check
        // runs regardless of the watch list.
        let completion = self.tracker.on_incoming(&message).await;
        if let Some(notice) = &completion {
            self.router.announce_completion(notice).await;
        }

        let (matched, forwards) = if self.is_watched(&message.channel_id) {
            let matched = {
                let keywords = self.keywords.read().await;
                self.classifier.classify(&message.text, &keywords)
            };
            let forwards = self.router.route(&message, &matched).await;
            for forward in &forwards {
                if let Ok(handle) = &forward.outcome {
                    self.tracker
                        .register(PendingTask {
                            forwarded_id: handle.id.clone(),
                            origin_channel: message.channel_id.clone(),
                            task_text: message.text.clone(),
                            category: forward.category.clone(),
                            created_at: Utc::now(),
                        })
                        .await;
                }
            }
            (matched, forwards)
        } else {
            Default::default()
        };

        let processed = ProcessedMessage {
            original: message,
            matched,
            forwards,
            completion,
            processed_at: Utc::now(),
        };
        info!(
            id = %processed.original.id,
            disposition = processed.label(),
            forwards = processed.forwards.len(),
            "Message processed"
        );
        processed
    }

    /// Re-read every keyword source. Phrases and routes stay fixed for the
    /// run.
    pub async fn reload_keywords(&self) {
        if self.keyword_sources.is_empty() {
            return;
        }
        let reloaded = KeywordStore::load(&self.keyword_sources);
        *self.keywords.write().await = reloaded;
        info!("Keyword sets reloaded");
    }

    /// Tasks still awaiting confirmation, oldest first.
    pub async fn pending_tasks(&self) -> Vec<PendingTask> {
        self.tracker.pending().await
    }

    fn is_watched(&self, channel_id: &str) -> bool {
        self.watch_channels.is_empty() || self.watch_channels.iter().any(|c| c == channel_id)
    }
}
