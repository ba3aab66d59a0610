//! Property-based tests for the state machine

use super::*;
use crate::chat::SessionId;
use crate::ledger::{Amount, Categories, EntryKind};
use proptest::prelude::*;
use std::sync::Arc;

fn test_context() -> SessionContext {
    SessionContext::new(SessionId(1), Arc::new(Categories::default()))
}

fn arb_kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Income), Just(EntryKind::Expense)]
}

fn arb_amount() -> impl Strategy<Value = Amount> {
    (1u32..1_000_000).prop_map(|cents| Amount::new(f64::from(cents) / 100.0).unwrap())
}

fn arb_collecting_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::SelectingKind),
        arb_kind().prop_map(|kind| ConvState::CollectingName { kind }),
        (arb_kind(), "[a-zA-Z ]{1,20}")
            .prop_map(|(kind, name)| ConvState::CollectingAmount { kind, name }),
        (arb_kind(), "[a-zA-Z ]{1,20}", arb_amount()).prop_map(|(kind, name, amount)| {
            ConvState::CollectingCategory { kind, name, amount }
        }),
    ]
}

proptest! {
    #[test]
    fn cancel_from_any_collecting_state_never_commits(state in arb_collecting_state()) {
        let result = transition(&state, &test_context(), Event::UserCancel).unwrap();
        prop_assert_eq!(result.new_state, ConvState::Cancelled);
        let no_commit = result
            .effects
            .iter()
            .all(|effect| !matches!(effect, Effect::CommitEntry { .. }));
        prop_assert!(no_commit);
    }

    #[test]
    fn non_numeric_amount_preserves_fields(
        kind in arb_kind(),
        name in "[a-zA-Z ]{1,20}",
        text in "[a-zA-Z!@#]{1,10}",
    ) {
        let state = ConvState::CollectingAmount { kind, name };
        let result = transition(&state, &test_context(), Event::text(text)).unwrap();
        prop_assert_eq!(result.new_state, state);
    }

    #[test]
    fn unknown_category_preserves_fields(
        kind in arb_kind(),
        name in "[a-zA-Z ]{1,20}",
        amount in arb_amount(),
        text in "[a-z]{1,12}",
    ) {
        let state = ConvState::CollectingCategory { kind, name, amount };
        let result = transition(&state, &test_context(), Event::text(text)).unwrap();
        prop_assert_eq!(&result.new_state, &state);
        let replies_only = result
            .effects
            .iter()
            .all(|effect| matches!(effect, Effect::Reply(_)));
        prop_assert!(replies_only);
    }

    #[test]
    fn commit_only_leaves_category_state(
        state in arb_collecting_state(),
        text in "\\PC{0,20}",
    ) {
        let result = transition(&state, &test_context(), Event::text(text));
        if let Ok(result) = result {
            let commits = result
                .effects
                .iter()
                .any(|effect| matches!(effect, Effect::CommitEntry { .. }));
            if commits {
                let from_category = matches!(state, ConvState::CollectingCategory { .. });
                prop_assert!(from_category, "commit emitted from {}", state.name());
                let is_committing = matches!(result.new_state, ConvState::Committing { .. });
                prop_assert!(is_committing);
            }
        }
    }
}
