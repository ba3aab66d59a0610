//! Pure state transition function

use super::prompts;
use super::{ConvState, Effect, Event, SessionContext};
use crate::ledger::{EntryDraft, EntryKind};
use crate::validator::{parse_amount, validate_category};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Entry is being recorded, wait for the result")]
    CommitInProgress,
    #[error("Session already ended")]
    SessionEnded,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Opening state and prompt of a fresh session
pub fn start() -> TransitionResult {
    TransitionResult::new(ConvState::SelectingKind).with_effect(Effect::reply_with_choices(
        prompts::KIND_PROMPT,
        &prompts::kind_choices(),
    ))
}

/// Pure transition function: no I/O, same inputs give the same outputs.
pub fn transition(
    state: &ConvState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Terminal states accept nothing
        (ConvState::Committed { .. } | ConvState::Cancelled, _) => {
            Err(TransitionError::SessionEnded)
        }

        (ConvState::Committing { .. }, Event::UserText { .. } | Event::UserCancel) => {
            Err(TransitionError::CommitInProgress)
        }

        (_, Event::UserCancel) => Ok(TransitionResult::new(ConvState::Cancelled)
            .with_effect(Effect::reply(prompts::CANCELLED))),

        // ============================================================
        // Collection
        // ============================================================
        (ConvState::SelectingKind, Event::UserText { text }) => {
            match prompts::kind_from_label(text.trim()) {
                Some(kind) => Ok(TransitionResult::new(ConvState::CollectingName { kind })
                    .with_effect(Effect::reply(prompts::name_prompt(kind)))),
                None => Ok(
                    TransitionResult::new(ConvState::SelectingKind).with_effect(
                        Effect::reply_with_choices(prompts::INVALID_KIND, &prompts::kind_choices()),
                    ),
                ),
            }
        }

        (ConvState::CollectingName { kind }, Event::UserText { text }) => {
            let kind = *kind;
            let name = text.trim();
            if name.is_empty() {
                return Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::name_prompt(kind))));
            }
            Ok(TransitionResult::new(ConvState::CollectingAmount {
                kind,
                name: name.to_string(),
            })
            .with_effect(Effect::reply(prompts::amount_prompt(kind))))
        }

        (ConvState::CollectingAmount { kind, name }, Event::UserText { text }) => {
            let kind = *kind;
            match parse_amount(&text) {
                Ok(amount) => Ok(TransitionResult::new(ConvState::CollectingCategory {
                    kind,
                    name: name.clone(),
                    amount,
                })
                .with_effect(category_prompt(context, kind))),
                Err(_) => Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::INVALID_AMOUNT))),
            }
        }

        (ConvState::CollectingCategory { kind, name, amount }, Event::UserText { text }) => {
            let kind = *kind;
            let allowed = context.categories_for(kind);
            match validate_category(&text, allowed) {
                Ok(category) => {
                    let draft = EntryDraft {
                        kind,
                        name: name.clone(),
                        amount: *amount,
                        category,
                    };
                    Ok(TransitionResult::new(ConvState::Committing {
                        draft: draft.clone(),
                    })
                    .with_effect(Effect::CommitEntry { draft }))
                }
                Err(_) => Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply_with_choices(prompts::INVALID_CATEGORY, allowed))),
            }
        }

        // ============================================================
        // Ledger outcome
        // ============================================================
        (ConvState::Committing { draft }, Event::CommitSucceeded { row }) => {
            let text = prompts::confirmation(draft.kind, draft.amount, &draft.category);
            Ok(TransitionResult::new(ConvState::Committed {
                row,
                draft: draft.clone(),
            })
            .with_effect(Effect::reply(text)))
        }

        // Back to category selection so resending a category retries the write
        (ConvState::Committing { draft }, Event::CommitFailed { .. }) => {
            let allowed = context.categories_for(draft.kind);
            Ok(TransitionResult::new(ConvState::CollectingCategory {
                kind: draft.kind,
                name: draft.name.clone(),
                amount: draft.amount,
            })
            .with_effect(Effect::reply_with_choices(prompts::STORE_FAILURE, allowed)))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} on {event:?}",
            state.name()
        ))),
    }
}

fn category_prompt(context: &SessionContext, kind: EntryKind) -> Effect {
    Effect::reply_with_choices(prompts::category_prompt(kind), context.categories_for(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Reply, SessionId};
    use crate::ledger::{Amount, Categories, Category};
    use std::sync::Arc;

    fn context() -> SessionContext {
        SessionContext::new(SessionId(7), Arc::new(Categories::default()))
    }

    fn step(state: &ConvState, event: Event) -> TransitionResult {
        transition(state, &context(), event).unwrap()
    }

    fn reply_text(result: &TransitionResult) -> &str {
        match result.effects.as_slice() {
            [Effect::Reply(Reply { text, .. })] => text,
            other => panic!("expected a single reply, got {other:?}"),
        }
    }

    fn salary_draft() -> EntryDraft {
        EntryDraft {
            kind: EntryKind::Income,
            name: "Salary".to_string(),
            amount: Amount::new(5000.0).unwrap(),
            category: Category::new("משכורת"),
        }
    }

    #[test]
    fn test_start_offers_both_kinds() {
        let result = start();
        assert_eq!(result.new_state, ConvState::SelectingKind);
        assert_eq!(
            result.effects,
            vec![Effect::Reply(Reply::with_choices(
                prompts::KIND_PROMPT,
                vec!["הכנסה".to_string(), "הוצאה".to_string()],
            ))]
        );
    }

    #[test]
    fn test_full_income_conversation() {
        let result = step(&ConvState::SelectingKind, Event::text("הכנסה"));
        assert_eq!(
            result.new_state,
            ConvState::CollectingName {
                kind: EntryKind::Income
            }
        );
        assert_eq!(reply_text(&result), "נא להזין את שם ההכנסה.");

        let result = step(&result.new_state, Event::text("Salary"));
        assert_eq!(reply_text(&result), "נא להזין את סכום ההכנסה.");

        let result = step(&result.new_state, Event::text("5000"));
        assert_eq!(
            result.new_state,
            ConvState::CollectingCategory {
                kind: EntryKind::Income,
                name: "Salary".to_string(),
                amount: Amount::new(5000.0).unwrap(),
            }
        );
        match result.effects.as_slice() {
            [Effect::Reply(Reply {
                choices: Some(choices),
                ..
            })] => assert_eq!(choices, Categories::default().for_kind(EntryKind::Income)),
            other => panic!("expected category choices, got {other:?}"),
        }

        let result = step(&result.new_state, Event::text("משכורת"));
        assert_eq!(
            result.new_state,
            ConvState::Committing {
                draft: salary_draft()
            }
        );
        assert_eq!(
            result.effects,
            vec![Effect::CommitEntry {
                draft: salary_draft()
            }]
        );

        let result = step(&result.new_state, Event::CommitSucceeded { row: 3 });
        assert!(result.new_state.is_terminal());
        assert_eq!(reply_text(&result), "הכנסה של 5000 (משכורת) נרשמה בהצלחה.");
    }

    #[test]
    fn test_unknown_kind_reprompts() {
        let result = step(&ConvState::SelectingKind, Event::text("maybe"));
        assert_eq!(result.new_state, ConvState::SelectingKind);
        assert_eq!(reply_text(&result), prompts::INVALID_KIND);
    }

    #[test]
    fn test_blank_name_reprompts() {
        let state = ConvState::CollectingName {
            kind: EntryKind::Expense,
        };
        let result = step(&state, Event::text("   "));
        assert_eq!(result.new_state, state);
        assert_eq!(reply_text(&result), "נא להזין את שם ההוצאה.");
    }

    #[test]
    fn test_invalid_amount_keeps_name() {
        let state = ConvState::CollectingAmount {
            kind: EntryKind::Expense,
            name: "Groceries".to_string(),
        };
        let result = step(&state, Event::text("abc"));
        assert_eq!(result.new_state, state);
        assert_eq!(reply_text(&result), prompts::INVALID_AMOUNT);

        let result = step(&state, Event::text("120.50"));
        assert_eq!(
            result.new_state,
            ConvState::CollectingCategory {
                kind: EntryKind::Expense,
                name: "Groceries".to_string(),
                amount: Amount::new(120.5).unwrap(),
            }
        );
    }

    #[test]
    fn test_category_from_other_kind_rejected() {
        let state = ConvState::CollectingCategory {
            kind: EntryKind::Income,
            name: "Salary".to_string(),
            amount: Amount::new(5000.0).unwrap(),
        };
        // "רכב" is an expense category
        let result = step(&state, Event::text("רכב"));
        assert_eq!(result.new_state, state);
        assert_eq!(reply_text(&result), prompts::INVALID_CATEGORY);
    }

    #[test]
    fn test_cancel_drops_collected_fields() {
        let state = ConvState::CollectingCategory {
            kind: EntryKind::Income,
            name: "Salary".to_string(),
            amount: Amount::new(5000.0).unwrap(),
        };
        let result = step(&state, Event::UserCancel);
        assert_eq!(result.new_state, ConvState::Cancelled);
        assert_eq!(reply_text(&result), prompts::CANCELLED);
    }

    #[test]
    fn test_commit_failure_returns_to_category() {
        let state = ConvState::Committing {
            draft: salary_draft(),
        };
        let result = step(
            &state,
            Event::CommitFailed {
                message: "quota".to_string(),
            },
        );
        assert_eq!(
            result.new_state,
            ConvState::CollectingCategory {
                kind: EntryKind::Income,
                name: "Salary".to_string(),
                amount: Amount::new(5000.0).unwrap(),
            }
        );
        assert_eq!(reply_text(&result), prompts::STORE_FAILURE);
    }

    #[test]
    fn test_input_rejected_while_committing() {
        let state = ConvState::Committing {
            draft: salary_draft(),
        };
        let ctx = context();
        assert_eq!(
            transition(&state, &ctx, Event::text("x")).unwrap_err(),
            TransitionError::CommitInProgress
        );
        assert_eq!(
            transition(&state, &ctx, Event::UserCancel).unwrap_err(),
            TransitionError::CommitInProgress
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let ctx = context();
        for state in [
            ConvState::Cancelled,
            ConvState::Committed {
                row: 3,
                draft: salary_draft(),
            },
        ] {
            assert_eq!(
                transition(&state, &ctx, Event::text("הכנסה")).unwrap_err(),
                TransitionError::SessionEnded
            );
            assert_eq!(
                transition(&state, &ctx, Event::UserCancel).unwrap_err(),
                TransitionError::SessionEnded
            );
        }
    }

    #[test]
    fn test_stray_commit_outcome_is_invalid() {
        let result = transition(
            &ConvState::SelectingKind,
            &context(),
            Event::CommitSucceeded { row: 3 },
        );
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition(_))
        ));
    }
}
