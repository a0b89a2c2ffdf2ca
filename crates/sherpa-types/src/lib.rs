//! Shared domain types for Sherpa.
//!
//! This crate contains the core domain types used across the tour guide:
//! places and turn contracts, enrichment records, LLM request/response
//! shapes, global configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod llm;
pub mod tour;
