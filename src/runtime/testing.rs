//! Mock implementations for testing
//!
//! These mocks enable end-to-end session tests without a chat service or a
//! real spreadsheet.

use super::traits::Clock;
use super::{SessionManager, SessionRuntime};
use crate::chat::{ChatError, ChatGateway, Reply, SessionId};
use crate::ledger::{Categories, LedgerStore, Period};
use crate::sheets::testing::MemorySheets;
use crate::state_machine::SessionContext;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WAIT_LIMIT: Duration = Duration::from_secs(2);

// ============================================================================
// Mock Chat Gateway
// ============================================================================

/// Records every reply; can be switched to fail sends
#[derive(Default)]
pub struct MockGateway {
    pub replies: Mutex<Vec<(SessionId, Reply)>>,
    failing: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn texts(&self, session: SessionId) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == session)
            .map(|(_, reply)| reply.text.clone())
            .collect()
    }

    pub fn last_text(&self, session: SessionId) -> Option<String> {
        self.texts(session).pop()
    }

    /// Wait until `session` has received at least `count` replies
    pub async fn wait_for_replies(&self, session: SessionId, count: usize) {
        let waited = tokio::time::timeout(WAIT_LIMIT, async {
            while self.texts(session).len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            waited.is_ok(),
            "timed out waiting for {count} replies to {session}, got {:?}",
            self.texts(session)
        );
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> Result<(), ChatError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChatError::Network("mock gateway offline".to_string()));
        }
        self.replies.lock().unwrap().push((session, reply.clone()));
        Ok(())
    }
}

// ============================================================================
// Fixed Clock
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ============================================================================
// Harness
// ============================================================================

pub type TestStore = LedgerStore<Arc<MemorySheets>>;

/// In-memory sheets, store, gateway, and a clock fixed at 2026-10-18
pub struct TestHarness {
    pub sheets: Arc<MemorySheets>,
    pub store: Arc<TestStore>,
    pub gateway: Arc<MockGateway>,
    pub clock: FixedClock,
}

impl TestHarness {
    pub fn new() -> Self {
        let sheets = Arc::new(MemorySheets::new());
        Self {
            store: Arc::new(LedgerStore::new(sheets.clone())),
            sheets,
            gateway: Arc::new(MockGateway::new()),
            clock: FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        }
    }

    /// Create the clock's period sheet ahead of time
    pub async fn bootstrap(&self) {
        self.store
            .get_or_create_period_sheet(Period::from_date(self.clock.0))
            .await
            .unwrap();
    }

    pub fn runtime(
        &self,
        session: SessionId,
    ) -> SessionRuntime<Arc<TestStore>, Arc<MockGateway>, FixedClock> {
        SessionRuntime::new(
            SessionContext::new(session, Arc::new(Categories::default())),
            self.store.clone(),
            self.gateway.clone(),
            self.clock,
        )
    }

    pub fn manager(&self) -> SessionManager {
        SessionManager::new(
            self.store.clone(),
            self.gateway.clone(),
            Arc::new(self.clock),
            Categories::default(),
        )
    }

    /// Wait until every session has ended and unregistered
    pub async fn wait_until_idle(&self, manager: &SessionManager) {
        let waited = tokio::time::timeout(WAIT_LIMIT, async {
            while manager.active_sessions().await > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "sessions still active");
    }
}
