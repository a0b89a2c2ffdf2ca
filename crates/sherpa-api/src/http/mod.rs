//! HTTP layer for Sherpa.
//!
//! `POST /answer` (plus `/api/v1/answer`) for visitor turns, session
//! inspection under `/api/v1/sessions`, and narration audio under `/audio`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
