//! Effects produced by state transitions

use crate::chat::Reply;
use crate::ledger::EntryDraft;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message back to the user
    Reply(Reply),

    /// Date the draft and append it to the ledger
    CommitEntry { draft: EntryDraft },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::text(text))
    }

    pub fn reply_with_choices(text: impl Into<String>, choices: &[String]) -> Self {
        Effect::Reply(Reply::with_choices(text, choices.to_vec()))
    }
}
