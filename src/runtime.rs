//! Runtime for executing conversations
//!
//! One task per chat session, fed by an mpsc channel. The manager routes
//! classified input to the right session and owns session lifetimes.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::chat::{ChatGateway, Inbound, Input, Reply, SessionId};
use crate::ledger::Categories;
use crate::state_machine::{prompts, Event, SessionContext};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Events a session may have queued before further input is turned away
const SESSION_QUEUE_CAPACITY: usize = 32;

/// Type alias for the runtime the manager spawns
pub type SharedRuntime =
    SessionRuntime<Arc<dyn LedgerWriter>, Arc<dyn ChatGateway>, Arc<dyn Clock>>;

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    /// Distinguishes a session from a later one for the same chat
    pub generation: u64,
}

/// Shared map of live sessions
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionRegistry {
    async fn get(&self, session: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&session).cloned()
    }

    async fn insert(&self, session: SessionId, handle: SessionHandle) -> Option<SessionHandle> {
        self.sessions.write().await.insert(session, handle)
    }

    /// Remove `session` only if it is still the given generation
    pub async fn remove(&self, session: SessionId, generation: u64) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(&session)
            .is_some_and(|handle| handle.generation == generation)
        {
            sessions.remove(&session);
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// What to tell a user whose input reached no live session
pub(crate) fn no_session_reply(event: &Event) -> Reply {
    match event {
        Event::UserCancel => Reply::text(prompts::NOTHING_TO_CANCEL),
        _ => Reply::text(prompts::NO_SESSION),
    }
}

/// Manager for all session runtimes
pub struct SessionManager {
    ledger: Arc<dyn LedgerWriter>,
    gateway: Arc<dyn ChatGateway>,
    clock: Arc<dyn Clock>,
    categories: Arc<Categories>,
    registry: SessionRegistry,
    next_generation: AtomicU64,
}

impl SessionManager {
    pub fn new(
        ledger: Arc<dyn LedgerWriter>,
        gateway: Arc<dyn ChatGateway>,
        clock: Arc<dyn Clock>,
        categories: Categories,
    ) -> Self {
        Self {
            ledger,
            gateway,
            clock,
            categories: Arc::new(categories),
            registry: SessionRegistry::default(),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Route one classified message
    pub async fn dispatch(&self, inbound: Inbound) {
        let Inbound { session, input } = inbound;
        match input {
            Input::Start => self.start_session(session).await,
            Input::Cancel => self.route(session, Event::UserCancel).await,
            Input::Text(text) => self.route(session, Event::text(text)).await,
        }
    }

    /// Number of sessions still collecting or committing
    pub async fn active_sessions(&self) -> usize {
        self.registry.count().await
    }

    async fn start_session(&self, session: SessionId) {
        let (event_tx, event_rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let replaced = self
            .registry
            .insert(
                session,
                SessionHandle {
                    event_tx,
                    generation,
                },
            )
            .await;
        if replaced.is_some() {
            tracing::info!(session = %session, "Restarting session; previous entry discarded");
        }

        let runtime: SharedRuntime = SessionRuntime::new(
            SessionContext::new(session, self.categories.clone()),
            self.ledger.clone(),
            self.gateway.clone(),
            self.clock.clone(),
        );
        let registry = self.registry.clone();
        tokio::spawn(async move {
            runtime.run(event_rx, registry, generation).await;
        });
    }

    /// Queue `event` for its session without waiting on it
    async fn route(&self, session: SessionId, event: Event) {
        let Some(handle) = self.registry.get(session).await else {
            tracing::debug!(session = %session, "Input without an active session");
            self.reply(session, &no_session_reply(&event)).await;
            return;
        };
        match handle.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(session = %session, "Session queue full; input dropped");
                self.reply(session, &Reply::text(prompts::STILL_RECORDING)).await;
            }
            // The session has ended and closed its queue
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(session = %session, "Input after session ended");
                self.reply(session, &no_session_reply(&event)).await;
            }
        }
    }

    async fn reply(&self, session: SessionId, reply: &Reply) {
        if let Err(e) = self.gateway.send_reply(session, reply).await {
            tracing::warn!(session = %session, error = %e, "Failed to send reply");
        }
    }
}
