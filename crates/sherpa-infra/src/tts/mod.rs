//! Text-to-speech narration backends.

pub mod elevenlabs;

pub use elevenlabs::ElevenLabsNarrator;
