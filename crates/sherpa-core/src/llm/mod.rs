//! Structured generation gateway.
//!
//! - `LlmProvider`: RPITIT trait for concrete backends
//! - `BoxLlmProvider`: object-safe wrapper with the uniform `generate` call

pub mod box_provider;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;
