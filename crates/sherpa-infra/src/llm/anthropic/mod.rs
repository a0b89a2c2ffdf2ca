//! Anthropic Claude generation backend.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
