//! LlmProvider trait definition.
//!
//! The port every generation backend implements. Uses RPITIT for `generate`;
//! `BoxLlmProvider` erases it for dynamic dispatch.

use sherpa_types::llm::{Generation, GenerationRequest, LlmError};

/// A generation backend (Gemini, OpenAI, Anthropic, ...).
///
/// Implementations live in sherpa-infra and always answer with the model
/// they were configured with.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini", "anthropic").
    fn name(&self) -> &str;

    /// Largest output the backing model accepts for one reply.
    fn max_output_tokens(&self) -> u32;

    /// Run one generation call.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<Generation, LlmError>> + Send;
}
