//! Per-session conversation record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sherpa_types::llm::Message;
use sherpa_types::tour::PreferenceRecord;

use crate::classifier::DEFAULT_LANGUAGE;

/// Mutable state of one visitor conversation.
///
/// Only the orchestrator mutates it. History is append-only between resets;
/// language, city and preferences are replaced in place.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub history: Vec<Message>,
    pub language: String,
    /// City name from the most recent turn's metadata; empty before the first turn.
    pub last_city: String,
    pub preferences: PreferenceRecord,
    pub turn_count: u64,
    pub last_active_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            last_city: String::new(),
            preferences: PreferenceRecord::default(),
            turn_count: 0,
            last_active_at: Utc::now(),
        }
    }

    /// Forget everything, as at the start of a new visit.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Drop the conversation history, keeping language and preferences.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Append one completed exchange and bump the turn counter.
    pub fn record_exchange(&mut self, user: Message, assistant: Message) {
        self.history.push(user);
        self.history.push(assistant);
        self.turn_count += 1;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            language: self.language.clone(),
            last_city: self.last_city.clone(),
            preferences: self.preferences.clone(),
            turn_count: self.turn_count,
            history_len: self.history.len(),
            last_active_at: self.last_active_at,
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a session for inspection endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub language: String,
    pub last_city: String,
    pub preferences: PreferenceRecord,
    pub turn_count: u64,
    pub history_len: usize,
    pub last_active_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = ConversationState::new();
        assert_eq!(state.language, "English");
        assert!(state.last_city.is_empty());
        assert!(state.history.is_empty());
        assert_eq!(state.turn_count, 0);
    }

    #[test]
    fn test_record_exchange_appends_in_order() {
        let mut state = ConversationState::new();
        state.record_exchange(Message::user("q1"), Message::assistant("a1"));
        state.record_exchange(Message::user("q2"), Message::assistant("a2"));

        let contents: Vec<_> = state.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
        assert_eq!(state.turn_count, 2);
    }

    #[test]
    fn test_clear_history_keeps_language_and_preferences() {
        let mut state = ConversationState::new();
        state.language = "Spanish".to_string();
        state.preferences.likes.push("tapas".to_string());
        state.record_exchange(Message::user("q"), Message::assistant("a"));

        state.clear_history();
        assert!(state.history.is_empty());
        assert_eq!(state.language, "Spanish");
        assert_eq!(state.preferences.likes, vec!["tapas".to_string()]);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = ConversationState::new();
        state.language = "Hindi".to_string();
        state.last_city = "Delhi".to_string();
        state.record_exchange(Message::user("q"), Message::assistant("a"));

        state.reset();
        assert_eq!(state.language, "English");
        assert!(state.last_city.is_empty());
        assert_eq!(state.turn_count, 0);
    }

    #[test]
    fn test_snapshot_reports_history_len() {
        let mut state = ConversationState::new();
        state.record_exchange(Message::user("q"), Message::assistant("a"));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.history_len, 2);
        assert_eq!(snapshot.turn_count, 1);
    }
}
