//! Conversation state and the session-keyed store.

mod state;
mod store;

pub use state::{ConversationState, SessionSnapshot};
pub use store::SessionStore;
