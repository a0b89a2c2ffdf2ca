//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and owns the uniform
//!    `generate` call the classifiers and the orchestrator use

use std::future::Future;
use std::pin::Pin;

use tracing::{Instrument, info_span};

use sherpa_types::llm::{FinishReason, Generation, GenerationRequest, LlmError, Message};

use super::provider::LlmProvider;

type GenerationFuture<'a> = Pin<Box<dyn Future<Output = Result<Generation, LlmError>> + Send + 'a>>;

/// Object-safe version of [`LlmProvider`] with boxed futures.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn max_output_tokens(&self) -> u32;

    fn generate_boxed<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a>;
}

/// Blanket implementation: any `LlmProvider` automatically implements `LlmProviderDyn`.
impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn max_output_tokens(&self) -> u32 {
        LlmProvider::max_output_tokens(self)
    }

    fn generate_boxed<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased generation backend chosen at startup from config.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.inner.max_output_tokens()
    }

    /// System instruction plus ordered history in, raw text out.
    ///
    /// `max_tokens` is capped at the backend's limit. A reply cut off by the
    /// cap is still returned (and logged) so the normalizer can decide; a
    /// filtered reply is an error. Every call runs inside a `gen_ai.complete`
    /// span.
    pub async fn generate(
        &self,
        system: &str,
        history: &[Message],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let request = GenerationRequest {
            system: system.to_string(),
            messages: history.to_vec(),
            temperature,
            max_tokens: max_tokens.min(self.max_output_tokens()),
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.name(),
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = temperature,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        let generation = self
            .inner
            .generate_boxed(&request)
            .instrument(span.clone())
            .await?;

        span.record("gen_ai.response.model", generation.model.as_str());
        span.record("gen_ai.response.finish_reasons", generation.finish.as_str());
        span.record("gen_ai.usage.input_tokens", generation.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", generation.usage.output_tokens);

        match generation.finish {
            FinishReason::Complete => Ok(generation.text),
            FinishReason::Truncated => {
                tracing::warn!(
                    parent: &span,
                    max_tokens = request.max_tokens,
                    "Generation hit the output cap; reply may be cut off"
                );
                Ok(generation.text)
            }
            FinishReason::Filtered => Err(LlmError::ContentFiltered),
        }
    }
}
