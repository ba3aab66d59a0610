//! Session runtime executor

use super::traits::{Clock, LedgerWriter};
use super::{no_session_reply, SessionRegistry};
use crate::chat::{ChatGateway, Reply};
use crate::ledger::Period;
use crate::state_machine::{
    start, transition, ConvState, Effect, Event, SessionContext, TransitionError, TransitionResult,
};
use tokio::sync::mpsc;

/// Drives one conversation: applies transitions and executes their effects
pub struct SessionRuntime<L, G, K>
where
    L: LedgerWriter,
    G: ChatGateway,
    K: Clock,
{
    context: SessionContext,
    state: ConvState,
    ledger: L,
    gateway: G,
    clock: K,
}

impl<L, G, K> SessionRuntime<L, G, K>
where
    L: LedgerWriter,
    G: ChatGateway,
    K: Clock,
{
    pub fn new(context: SessionContext, ledger: L, gateway: G, clock: K) -> Self {
        Self {
            context,
            state: ConvState::default(),
            ledger,
            gateway,
            clock,
        }
    }

    #[allow(dead_code)] // State inspection for tests
    pub fn state(&self) -> &ConvState {
        &self.state
    }

    /// Send the opening prompt
    pub async fn start(&mut self) {
        self.apply(start()).await;
    }

    /// Handle one event to completion, including any ledger write it triggers
    pub async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let mut pending = Some(event);

        while let Some(current) = pending.take() {
            let result = transition(&self.state, &self.context, current)?;
            pending = self.apply(result).await;
        }

        Ok(())
    }

    /// Enter the new state and run its effects; returns the event an effect produced
    async fn apply(&mut self, result: TransitionResult) -> Option<Event> {
        let old = std::mem::replace(&mut self.state, result.new_state);
        if old.name() != self.state.name() {
            tracing::debug!(
                session = %self.context.session_id,
                from = old.name(),
                to = self.state.name(),
                "State transition"
            );
        }

        let mut generated = None;
        for effect in result.effects {
            if let Some(event) = self.execute_effect(effect).await {
                generated = Some(event);
            }
        }
        generated
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Reply(reply) => {
                self.send(&reply).await;
                None
            }
            Effect::CommitEntry { draft } => {
                // One clock reading names the sheet and dates the row
                let today = self.clock.today();
                let period = Period::from_date(today);
                let entry = draft.dated(today);

                match self.ledger.append(period, draft.kind, &entry).await {
                    Ok(row) => {
                        tracing::info!(
                            session = %self.context.session_id,
                            kind = %draft.kind,
                            %period,
                            row,
                            "Entry committed"
                        );
                        Some(Event::CommitSucceeded { row })
                    }
                    Err(e) => {
                        tracing::warn!(
                            session = %self.context.session_id,
                            kind = %draft.kind,
                            %period,
                            error = %e,
                            "Entry commit failed"
                        );
                        Some(Event::CommitFailed {
                            message: e.to_string(),
                        })
                    }
                }
            }
        }
    }

    async fn send(&self, reply: &Reply) {
        if let Err(e) = self.gateway.send_reply(self.context.session_id, reply).await {
            tracing::warn!(session = %self.context.session_id, error = %e, "Failed to send reply");
        }
    }

    /// Run until the conversation ends or its channel closes.
    ///
    /// On reaching a terminal state the session unregisters itself (unless a
    /// newer session already took its slot) and answers whatever was still
    /// queued as if no session existed.
    pub async fn run(
        mut self,
        mut event_rx: mpsc::Receiver<Event>,
        registry: SessionRegistry,
        generation: u64,
    ) {
        let session = self.context.session_id;
        tracing::info!(session = %session, "Session started");
        self.start().await;

        while !self.state.is_terminal() {
            let Some(event) = event_rx.recv().await else {
                tracing::info!(session = %session, state = self.state.name(), "Session replaced");
                return;
            };
            if let Err(e) = self.process_event(event).await {
                tracing::warn!(session = %session, state = self.state.name(), error = %e, "Event rejected");
            }
        }

        registry.remove(session, generation).await;
        event_rx.close();
        while let Some(event) = event_rx.recv().await {
            self.send(&no_session_reply(&event)).await;
        }

        tracing::info!(session = %session, state = self.state.name(), "Session finished");
    }
}
