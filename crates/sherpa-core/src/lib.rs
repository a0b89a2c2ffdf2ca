//! Dialogue orchestration core for Sherpa.
//!
//! This crate defines the "ports" (generation, enrichment and narration
//! traits) that the infrastructure layer implements, plus everything that
//! runs a turn: the response normalizer, the classifier bank, conversation
//! state and the orchestrator. It depends only on `sherpa-types` -- never on
//! `sherpa-infra` or any network crate.

pub mod classifier;
pub mod enrichment;
pub mod guide;
pub mod llm;
pub mod narration;
pub mod normalize;
pub mod session;
