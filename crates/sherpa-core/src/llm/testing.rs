//! Scripted mock provider shared by the core test modules.

use std::future::Future;
use std::sync::{Arc, Mutex};

use sherpa_types::llm::{FinishReason, Generation, GenerationRequest, LlmError, TokenUsage};

use super::provider::LlmProvider;

type Responder = dyn Fn(&GenerationRequest) -> Result<String, LlmError> + Send + Sync;

/// Provider whose reply is computed from the request by a closure.
///
/// Concurrent classifier calls arrive in no fixed order, so scripts route on
/// the system prompt rather than on call order. Every request is recorded.
pub(crate) struct ScriptedProvider {
    respond: Arc<Responder>,
    finish: FinishReason,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(
        respond: impl Fn(&GenerationRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Arc::new(respond),
            finish: FinishReason::Complete,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn always(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub(crate) fn failing() -> Self {
        Self::new(|_| Err(LlmError::Backend("scripted failure".to_string())))
    }

    /// Report `finish` on every successful reply.
    pub(crate) fn finishing(mut self, finish: FinishReason) -> Self {
        self.finish = finish;
        self
    }

    /// Shared handle to the recorded requests.
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        Arc::clone(&self.calls)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn max_output_tokens(&self) -> u32 {
        8192
    }

    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<Generation, LlmError>> + Send {
        self.calls.lock().unwrap().push(request.clone());
        let result = (self.respond)(request);
        let finish = self.finish;
        async move {
            result.map(|text| Generation {
                text,
                model: "scripted-model".to_string(),
                finish,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            })
        }
    }
}
