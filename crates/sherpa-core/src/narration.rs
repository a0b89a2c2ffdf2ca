//! Spoken-audio side channel.
//!
//! A `Narrator` turns the final speech text into an audio file served under
//! `/audio/`. The URL is known before rendering finishes, so the orchestrator
//! attaches it to the response and renders in a background task.

use sherpa_types::error::NarrationError;

/// Text-to-speech backend.
pub trait Narrator: Send + Sync + 'static {
    /// URL the rendered audio will be served at, or `None` when narration
    /// is disabled.
    fn audio_url(&self, text: &str, language: &str) -> Option<String>;

    /// Render `text` to audio. Already-rendered text is a no-op.
    fn render(
        &self,
        text: &str,
        language: &str,
    ) -> impl std::future::Future<Output = Result<(), NarrationError>> + Send;
}

/// Narrator used when audio is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNarration;

impl Narrator for NoNarration {
    fn audio_url(&self, _text: &str, _language: &str) -> Option<String> {
        None
    }

    async fn render(&self, _text: &str, _language: &str) -> Result<(), NarrationError> {
        Ok(())
    }
}
