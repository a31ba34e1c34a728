//! Message pipeline: classify → route → track confirmations.

pub mod classifier;
pub mod processor;
pub mod router;
pub mod tracker;
pub mod types;

pub use classifier::Classifier;
pub use processor::MessageProcessor;
pub use router::Router;
pub use tracker::ConfirmationTracker;
pub use types::{
    CompletionNotice, ForwardResult, InboundMessage, PendingTask, ProcessedMessage, QuotedMessage,
};
