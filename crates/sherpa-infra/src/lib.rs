//! Infrastructure layer for Sherpa.
//!
//! Contains implementations of the traits defined in `sherpa-core`:
//! generation backends (Anthropic, OpenAI-compatible), Google Places and
//! Geocoding, Wikipedia background text, ElevenLabs narration, and the
//! `config.toml` loader.

pub mod config;
pub mod llm;
pub mod places;
pub mod tts;
pub mod wiki;
