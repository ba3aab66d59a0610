//! In-memory sheet backend for testing
//!
//! Records every call so tests can assert on side effects, and can inject
//! latency and failures.

use super::{
    CellRef, CellStyle, CellValue, ConditionalRule, GridSize, RangeRef, SheetClient, SheetError,
    SheetErrorKind, SheetRef,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct MemorySheet {
    pub sheet: Option<SheetRef>,
    pub grid: Option<GridSize>,
    pub cells: BTreeMap<CellRef, CellValue>,
    pub merges: Vec<RangeRef>,
    pub styles: Vec<(RangeRef, CellStyle)>,
    pub rules: Vec<ConditionalRule>,
    pub right_to_left: bool,
}

/// Sheet client backed by process memory
#[allow(dead_code)]
pub struct MemorySheets {
    sheets: Mutex<Vec<MemorySheet>>,
    latency: Option<Duration>,
    offline: Mutex<bool>,
    failing_cells: Mutex<Vec<CellRef>>,
    /// Every successful `write_range`, in order
    pub writes: Mutex<Vec<(String, RangeRef)>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    next_id: AtomicUsize,
}

#[allow(dead_code)]
impl MemorySheets {
    pub fn new() -> Self {
        Self {
            sheets: Mutex::new(Vec::new()),
            latency: None,
            offline: Mutex::new(false),
            failing_cells: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Sleep this long inside every read and write
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Fail any write whose range covers `cell`
    pub fn fail_writes_touching(&self, cell: CellRef) {
        self.failing_cells.lock().unwrap().push(cell);
    }

    pub fn clear_failures(&self) {
        self.failing_cells.lock().unwrap().clear();
        self.set_offline(false);
    }

    /// Insert a worksheet directly, bypassing `create_sheet` accounting
    pub fn seed_sheet(&self, title: &str) -> SheetRef {
        let sheet = SheetRef {
            id: self.allocate_id(),
            title: title.to_string(),
        };
        self.sheets.lock().unwrap().push(MemorySheet {
            sheet: Some(sheet.clone()),
            ..MemorySheet::default()
        });
        sheet
    }

    /// Overwrite one cell directly
    pub fn put_cell(&self, title: &str, cell: CellRef, value: CellValue) {
        self.with_sheet_mut(title, |s| {
            s.cells.insert(cell, value);
        });
    }

    pub fn snapshot(&self, title: &str) -> Option<MemorySheet> {
        self.sheets
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.sheet.as_ref().is_some_and(|r| r.title == title))
            .cloned()
    }

    pub fn cell(&self, title: &str, cell: CellRef) -> Option<CellValue> {
        self.snapshot(title).and_then(|s| s.cells.get(&cell).cloned())
    }

    /// Values of one row, `width` cells starting at `start`
    pub fn row_values(&self, title: &str, start: CellRef, width: u32) -> Vec<Option<CellValue>> {
        (0..width)
            .map(|offset| self.cell(title, CellRef::new(start.column + offset, start.row)))
            .collect()
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn allocate_id(&self) -> i64 {
        i64::try_from(self.next_id.fetch_add(1, Ordering::SeqCst)).unwrap()
    }

    fn with_sheet_mut<R>(&self, title: &str, f: impl FnOnce(&mut MemorySheet) -> R) -> Option<R> {
        let mut sheets = self.sheets.lock().unwrap();
        sheets
            .iter_mut()
            .find(|s| s.sheet.as_ref().is_some_and(|r| r.title == title))
            .map(f)
    }

    fn check_online(&self) -> Result<(), SheetError> {
        if *self.offline.lock().unwrap() {
            Err(SheetError::network("backend offline"))
        } else {
            Ok(())
        }
    }

    async fn delay(&self) {
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
    }

    fn missing(sheet: &SheetRef) -> SheetError {
        SheetError::not_found(format!("no sheet {}", sheet.title))
    }
}

impl Default for MemorySheets {
    fn default() -> Self {
        Self::new()
    }
}

fn render(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) | CellValue::Formula(s) => s.clone(),
        CellValue::Number(n) => n.to_string(),
    }
}

#[async_trait]
impl SheetClient for MemorySheets {
    async fn list_sheets(&self) -> Result<Vec<SheetRef>, SheetError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.delay().await;
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| s.sheet.clone())
            .collect())
    }

    async fn create_sheet(&self, title: &str, grid: GridSize) -> Result<SheetRef, SheetError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.delay().await;
        let mut sheets = self.sheets.lock().unwrap();
        if sheets
            .iter()
            .any(|s| s.sheet.as_ref().is_some_and(|r| r.title == title))
        {
            return Err(SheetError::new(
                SheetErrorKind::InvalidRequest,
                format!("sheet {title} already exists"),
            ));
        }
        let sheet = SheetRef {
            id: self.allocate_id(),
            title: title.to_string(),
        };
        sheets.push(MemorySheet {
            sheet: Some(sheet.clone()),
            grid: Some(grid),
            ..MemorySheet::default()
        });
        Ok(sheet)
    }

    async fn read_cell(&self, sheet: &SheetRef, cell: CellRef) -> Result<String, SheetError> {
        self.check_online()?;
        self.delay().await;
        self.with_sheet_mut(&sheet.title, |s| {
            s.cells.get(&cell).map(render).unwrap_or_default()
        })
        .ok_or_else(|| Self::missing(sheet))
    }

    async fn write_range(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), SheetError> {
        self.check_online()?;
        self.delay().await;
        if self
            .failing_cells
            .lock()
            .unwrap()
            .iter()
            .any(|c| range.contains(*c))
        {
            return Err(SheetError::new(
                SheetErrorKind::ServerError,
                format!("injected failure writing {range}"),
            ));
        }
        self.with_sheet_mut(&sheet.title, |s| {
            for (dy, row) in (0u32..).zip(rows) {
                for (dx, value) in (0u32..).zip(row) {
                    let cell = CellRef::new(range.start.column + dx, range.start.row + dy);
                    s.cells.insert(cell, value.clone());
                }
            }
        })
        .ok_or_else(|| Self::missing(sheet))?;
        self.writes
            .lock()
            .unwrap()
            .push((sheet.title.clone(), range));
        Ok(())
    }

    async fn set_formatting(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        style: &CellStyle,
    ) -> Result<(), SheetError> {
        self.check_online()?;
        self.with_sheet_mut(&sheet.title, |s| s.styles.push((range, *style)))
            .ok_or_else(|| Self::missing(sheet))
    }

    async fn set_conditional_format(
        &self,
        sheet: &SheetRef,
        rule: &ConditionalRule,
    ) -> Result<(), SheetError> {
        self.check_online()?;
        self.with_sheet_mut(&sheet.title, |s| s.rules.push(rule.clone()))
            .ok_or_else(|| Self::missing(sheet))
    }

    async fn merge_cells(&self, sheet: &SheetRef, range: RangeRef) -> Result<(), SheetError> {
        self.check_online()?;
        self.with_sheet_mut(&sheet.title, |s| s.merges.push(range))
            .ok_or_else(|| Self::missing(sheet))
    }

    async fn set_right_to_left(&self, sheet: &SheetRef) -> Result<(), SheetError> {
        self.check_online()?;
        self.with_sheet_mut(&sheet.title, |s| s.right_to_left = true)
            .ok_or_else(|| Self::missing(sheet))
    }
}
