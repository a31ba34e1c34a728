//! Task Relay — keyword-routed task forwarding for group chats.
//!
//! Watches configured group channels, classifies each message against
//! per-category keyword sets, forwards matches to the category's destination
//! channel, and closes the loop when someone replies to a forwarded task with
//! a confirmation phrase.

pub mod config;
pub mod error;
pub mod keywords;
pub mod pipeline;
pub mod transport;
