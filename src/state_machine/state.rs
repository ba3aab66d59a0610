//! Conversation state types

use crate::chat::SessionId;
use crate::ledger::{Amount, Categories, EntryDraft, EntryKind};
use std::sync::Arc;

/// Conversation state; each step carries exactly the fields collected so far
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConvState {
    /// Waiting for the user to pick income or expense
    #[default]
    SelectingKind,

    CollectingName { kind: EntryKind },

    CollectingAmount { kind: EntryKind, name: String },

    CollectingCategory {
        kind: EntryKind,
        name: String,
        amount: Amount,
    },

    /// Ledger write in flight
    Committing { draft: EntryDraft },

    /// Entry recorded (terminal)
    Committed { row: u32, draft: EntryDraft },

    /// User abandoned the entry (terminal)
    Cancelled,
}

impl ConvState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConvState::Committed { .. } | ConvState::Cancelled)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::SelectingKind => "selecting_kind",
            ConvState::CollectingName { .. } => "collecting_name",
            ConvState::CollectingAmount { .. } => "collecting_amount",
            ConvState::CollectingCategory { .. } => "collecting_category",
            ConvState::Committing { .. } => "committing",
            ConvState::Committed { .. } => "committed",
            ConvState::Cancelled => "cancelled",
        }
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub categories: Arc<Categories>,
}

impl SessionContext {
    pub fn new(session_id: SessionId, categories: Arc<Categories>) -> Self {
        Self {
            session_id,
            categories,
        }
    }

    pub fn categories_for(&self, kind: EntryKind) -> &[String] {
        self.categories.for_kind(kind)
    }
}
