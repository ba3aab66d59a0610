//! Ledger sheet bootstrap and entry appends

use super::layout::{self, BootstrapStep};
use super::{Entry, EntryKind, LedgerError, LedgerSheet, Period, RowAllocator};
use crate::sheets::{SheetClient, SheetError, SheetRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Owns the monthly sheets and their row counters
pub struct LedgerStore<C: SheetClient> {
    client: C,
    allocator: RowAllocator,
    /// Resolved sheets per period; concurrent first lookups share one cell
    sheets: Mutex<HashMap<Period, Arc<OnceCell<LedgerSheet>>>>,
}

impl<C: SheetClient> LedgerStore<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            allocator: RowAllocator::new(),
            sheets: Mutex::new(HashMap::new()),
        }
    }

    /// Find the sheet for `period`, creating and bootstrapping it on first use
    pub async fn get_or_create_period_sheet(
        &self,
        period: Period,
    ) -> Result<LedgerSheet, LedgerError> {
        let cell = self
            .sheets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(period)
            .or_default()
            .clone();
        cell.get_or_try_init(|| self.open_or_bootstrap(period))
            .await
            .cloned()
    }

    async fn open_or_bootstrap(&self, period: Period) -> Result<LedgerSheet, LedgerError> {
        let name = period.sheet_name();
        let existing = self
            .client
            .list_sheets()
            .await
            .map_err(|e| LedgerError::unavailable(&e))?;

        if let Some(sheet) = existing.into_iter().find(|s| s.title == name) {
            tracing::debug!(sheet = %name, "Using existing ledger sheet");
            return Ok(LedgerSheet { period, sheet });
        }

        tracing::info!(sheet = %name, "Creating ledger sheet");
        let sheet = self
            .client
            .create_sheet(&name, layout::GRID)
            .await
            .map_err(|e| LedgerError::unavailable(&e))?;

        for step in layout::bootstrap_steps() {
            if let Err(e) = self.apply(&sheet, step).await {
                tracing::error!(
                    sheet = %name,
                    error = %e,
                    "Bootstrap interrupted; sheet exists without counters"
                );
                return Err(LedgerError::unavailable(&e));
            }
        }

        Ok(LedgerSheet { period, sheet })
    }

    async fn apply(&self, sheet: &SheetRef, step: BootstrapStep) -> Result<(), SheetError> {
        match step {
            BootstrapStep::Write { range, rows } => {
                self.client.write_range(sheet, range, &rows).await
            }
            BootstrapStep::Merge(range) => self.client.merge_cells(sheet, range).await,
            BootstrapStep::ConditionalFormat(rule) => {
                self.client.set_conditional_format(sheet, &rule).await
            }
            BootstrapStep::RightToLeft => self.client.set_right_to_left(sheet).await,
            BootstrapStep::Format { range, style } => {
                self.client.set_formatting(sheet, range, &style).await
            }
        }
    }

    /// Write `entry` on the next free row of `kind`'s block and return that row.
    ///
    /// Allocate, write, then advance the counter. A failed row write leaves
    /// the counter where it was.
    pub async fn append(
        &self,
        period: Period,
        kind: EntryKind,
        entry: &Entry,
    ) -> Result<u32, LedgerError> {
        let sheet = self.get_or_create_period_sheet(period).await?;
        let claim = self.allocator.next_row(&self.client, &sheet, kind).await?;
        let row = claim.row();

        if let Err(e) = self
            .client
            .write_range(&sheet.sheet, layout::entry_range(kind, row), &[entry.to_row()])
            .await
        {
            tracing::warn!(sheet = %sheet.sheet.title, %kind, row, error = %e, "Entry write failed");
            return Err(LedgerError::write_failed(&e));
        }

        if let Err(e) = claim.commit(&self.client).await {
            // The next append reuses this row and overwrites it
            tracing::error!(
                sheet = %sheet.sheet.title,
                %kind,
                row,
                error = %e,
                "Entry written but row counter not advanced"
            );
            return Err(LedgerError::write_failed(&e));
        }

        tracing::info!(sheet = %sheet.sheet.title, %kind, row, "Entry appended");
        Ok(row)
    }
}
