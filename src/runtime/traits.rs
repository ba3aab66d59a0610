//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::ledger::{Entry, EntryKind, LedgerError, LedgerStore, Period};
use crate::sheets::SheetClient;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Destination for committed entries
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Append `entry` to `period`'s sheet and return the row it landed on
    async fn append(&self, period: Period, kind: EntryKind, entry: &Entry)
        -> Result<u32, LedgerError>;
}

/// Source of the current local date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the host's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[async_trait]
impl<C: SheetClient + 'static> LedgerWriter for LedgerStore<C> {
    async fn append(
        &self,
        period: Period,
        kind: EntryKind,
        entry: &Entry,
    ) -> Result<u32, LedgerError> {
        LedgerStore::append(self, period, kind, entry).await
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LedgerWriter + ?Sized> LedgerWriter for Arc<T> {
    async fn append(
        &self,
        period: Period,
        kind: EntryKind,
        entry: &Entry,
    ) -> Result<u32, LedgerError> {
        (**self).append(period, kind, entry).await
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
