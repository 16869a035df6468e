//! Language-model gateways: pre-send moderation and on-demand summaries.
//!
//! Both gateways absorb provider failures. Moderation fails closed;
//! summarization returns a fixed placeholder sentence.

pub mod client;
pub mod moderation;
pub mod summarize;

pub use client::{GeminiClient, ModelConfig, ModelError};
pub use moderation::{Classification, moderate_content};
pub use summarize::summarize_messages;
