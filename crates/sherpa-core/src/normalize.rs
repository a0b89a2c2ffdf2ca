//! Response normalization for model output.
//!
//! Models frequently wrap JSON in markdown fences or return prose. Everything
//! model-generated passes through here before it is trusted: fences are
//! stripped, the remainder is parsed into a typed record, and call sites that
//! can tolerate failure get their default back as a `StepResult::SoftFailure`.

use serde::de::DeserializeOwned;

/// Errors from parsing model output into a typed record.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("empty model output")]
    Empty,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Outcome of a step that never fails hard.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult<T> {
    Success(T),
    /// The step failed; `value` is the default that replaces its output.
    SoftFailure { value: T, reason: String },
}

impl<T> StepResult<T> {
    /// The produced value, whether real or substituted.
    pub fn into_value(self) -> T {
        match self {
            StepResult::Success(value) => value,
            StepResult::SoftFailure { value, .. } => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            StepResult::Success(value) => value,
            StepResult::SoftFailure { value, .. } => value,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepResult<U> {
        match self {
            StepResult::Success(value) => StepResult::Success(f(value)),
            StepResult::SoftFailure { value, reason } => StepResult::SoftFailure {
                value: f(value),
                reason,
            },
        }
    }
}

/// Remove a surrounding markdown code fence, if present.
///
/// Handles an opening line of triple backticks with an optional language
/// tag and an optional closing fence line. Unfenced text is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return trimmed.trim_start_matches('`').trim(),
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Strictly parse (possibly fenced) model output into `T`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, NormalizeError> {
    let stripped = strip_code_fence(raw);
    if stripped.is_empty() {
        return Err(NormalizeError::Empty);
    }
    Ok(serde_json::from_str(stripped)?)
}

/// Parse model output, substituting `default` on failure.
///
/// The raw text is logged (truncated) so bad generations can be inspected.
pub fn normalize_or<T: DeserializeOwned>(raw: &str, default: T, site: &str) -> StepResult<T> {
    match parse_json(raw) {
        Ok(value) => StepResult::Success(value),
        Err(e) => {
            tracing::warn!(
                site,
                error = %e,
                content_preview = preview(raw),
                "Failed to parse model output; using default"
            );
            StepResult::SoftFailure {
                value: default,
                reason: e.to_string(),
            }
        }
    }
}

/// First 200 bytes of `raw`, cut on a char boundary.
pub(crate) fn preview(raw: &str) -> &str {
    let mut end = raw.len().min(200);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}
