//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    UserText { text: String },
    UserCancel,

    // Ledger events
    CommitSucceeded { row: u32 },
    CommitFailed { message: String },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::UserText { text: text.into() }
    }
}
