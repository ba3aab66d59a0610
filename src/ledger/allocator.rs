//! Next-row allocation
//!
//! A claim holds the (period, kind) lock from the counter read until it is
//! committed or dropped, so no two writers ever see the same counter value.

use super::layout::{counter_cell, FIRST_DATA_ROW};
use super::{EntryKind, LedgerError, LedgerSheet, Period};
use crate::sheets::{CellValue, RangeRef, SheetClient, SheetError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct RowAllocator {
    locks: Mutex<HashMap<(Period, EntryKind), Arc<AsyncMutex<()>>>>,
}

impl RowAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, period: Period, kind: EntryKind) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry((period, kind))
            .or_default()
            .clone()
    }

    /// Lock the counter for (sheet, kind) and read its current value
    pub async fn next_row<C: SheetClient + ?Sized>(
        &self,
        client: &C,
        sheet: &LedgerSheet,
        kind: EntryKind,
    ) -> Result<RowClaim, LedgerError> {
        let guard = self.lock_for(sheet.period, kind).lock_owned().await;
        let cell = counter_cell(kind);
        let raw = client
            .read_cell(&sheet.sheet, cell)
            .await
            .map_err(|e| LedgerError::unavailable(&e))?;
        let (row, next) = parse_counter(&raw).ok_or_else(|| {
            tracing::error!(
                sheet = %sheet.sheet.title,
                cell = %cell,
                value = %raw,
                "Row counter is not a valid row number; fix the sheet manually"
            );
            LedgerError::StoreUnavailable(format!(
                "counter {}!{cell} holds {raw:?}, expected a row number",
                sheet.sheet.title
            ))
        })?;
        tracing::debug!(sheet = %sheet.sheet.title, %kind, row, "Row claimed");
        Ok(RowClaim {
            row,
            next,
            kind,
            sheet: sheet.clone(),
            _guard: guard,
        })
    }
}

/// The claimed row and the counter value that follows it
fn parse_counter(raw: &str) -> Option<(u32, u32)> {
    let row = raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|row| *row >= FIRST_DATA_ROW)?;
    Some((row, row.checked_add(1)?))
}

/// Exclusive right to write `row`; dropping it releases the lock without
/// touching the counter
pub struct RowClaim {
    row: u32,
    next: u32,
    kind: EntryKind,
    sheet: LedgerSheet,
    _guard: OwnedMutexGuard<()>,
}

impl RowClaim {
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Advance the counter past the claimed row, then release the lock
    pub async fn commit<C: SheetClient + ?Sized>(self, client: &C) -> Result<u32, SheetError> {
        let next = CellValue::Number(f64::from(self.next));
        client
            .write_range(
                &self.sheet.sheet,
                RangeRef::cell(counter_cell(self.kind)),
                &[vec![next]],
            )
            .await?;
        Ok(self.row)
    }
}
