//! Spreadsheet backend abstraction
//!
//! The ledger talks to the spreadsheet only through [`SheetClient`]. Formulas
//! and formatting travel as opaque payloads; nothing here interprets them.

mod a1;
mod error;
mod google;

#[cfg(test)]
pub mod testing;

pub use a1::{CellRef, RangeRef};
pub use error::{SheetError, SheetErrorKind};
pub use google::{GoogleSheetsClient, SheetsConfig, DEFAULT_SHEETS_API};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Handle to one worksheet inside the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRef {
    pub id: i64,
    pub title: String,
}

/// Dimensions used when creating a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: u32,
    pub columns: u32,
}

/// A single cell value to write
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Stored as-is, never parsed as a formula
    Text(String),
    Number(f64),
    /// Backend formula text, passed through verbatim
    Formula(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn formula(value: impl Into<String>) -> Self {
        CellValue::Formula(value.into())
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Cell formatting applied over a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

impl CellStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn centered() -> Self {
        Self {
            bold: false,
            horizontal: Some(HorizontalAlign::Center),
            vertical: Some(VerticalAlign::Middle),
        }
    }
}

/// RGB color, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const RED: Color = Color {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
    };
    pub const GREEN: Color = Color {
        red: 0.0,
        green: 1.0,
        blue: 0.0,
    };
}

/// Condition of a conditional-format rule; the operand is backend text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanCondition {
    NumberGreater(String),
    NumberLess(String),
}

/// Background color applied to `range` while `condition` holds
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    pub range: RangeRef,
    pub condition: BooleanCondition,
    pub background: Color,
}

/// Narrow interface to the spreadsheet backend
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// All worksheets in the spreadsheet
    async fn list_sheets(&self) -> Result<Vec<SheetRef>, SheetError>;

    /// Add a worksheet with the given title
    async fn create_sheet(&self, title: &str, grid: GridSize) -> Result<SheetRef, SheetError>;

    /// Formatted value of a single cell; empty string when the cell is blank
    async fn read_cell(&self, sheet: &SheetRef, cell: CellRef) -> Result<String, SheetError>;

    /// Write rows starting at the top-left of `range`
    async fn write_range(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), SheetError>;

    async fn set_formatting(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        style: &CellStyle,
    ) -> Result<(), SheetError>;

    async fn set_conditional_format(
        &self,
        sheet: &SheetRef,
        rule: &ConditionalRule,
    ) -> Result<(), SheetError>;

    async fn merge_cells(&self, sheet: &SheetRef, range: RangeRef) -> Result<(), SheetError>;

    /// Switch the worksheet to right-to-left layout
    async fn set_right_to_left(&self, sheet: &SheetRef) -> Result<(), SheetError>;
}

#[async_trait]
impl<T: SheetClient + ?Sized> SheetClient for Arc<T> {
    async fn list_sheets(&self) -> Result<Vec<SheetRef>, SheetError> {
        (**self).list_sheets().await
    }

    async fn create_sheet(&self, title: &str, grid: GridSize) -> Result<SheetRef, SheetError> {
        (**self).create_sheet(title, grid).await
    }

    async fn read_cell(&self, sheet: &SheetRef, cell: CellRef) -> Result<String, SheetError> {
        (**self).read_cell(sheet, cell).await
    }

    async fn write_range(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), SheetError> {
        (**self).write_range(sheet, range, rows).await
    }

    async fn set_formatting(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        style: &CellStyle,
    ) -> Result<(), SheetError> {
        (**self).set_formatting(sheet, range, style).await
    }

    async fn set_conditional_format(
        &self,
        sheet: &SheetRef,
        rule: &ConditionalRule,
    ) -> Result<(), SheetError> {
        (**self).set_conditional_format(sheet, rule).await
    }

    async fn merge_cells(&self, sheet: &SheetRef, range: RangeRef) -> Result<(), SheetError> {
        (**self).merge_cells(sheet, range).await
    }

    async fn set_right_to_left(&self, sheet: &SheetRef) -> Result<(), SheetError> {
        (**self).set_right_to_left(sheet).await
    }
}

/// Logging wrapper for sheet clients
pub struct LoggingSheetClient {
    inner: Arc<dyn SheetClient>,
}

impl LoggingSheetClient {
    pub fn new(inner: Arc<dyn SheetClient>) -> Self {
        Self { inner }
    }

    fn log<T>(op: &'static str, target: &str, start: Instant, result: &Result<T, SheetError>) {
        let duration = start.elapsed();
        match result {
            Ok(_) => {
                tracing::debug!(
                    op,
                    target,
                    duration_ms = %duration.as_millis(),
                    "Sheet call completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    op,
                    target,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    transient = e.kind.is_transient(),
                    "Sheet call failed"
                );
            }
        }
    }
}

#[async_trait]
impl SheetClient for LoggingSheetClient {
    async fn list_sheets(&self) -> Result<Vec<SheetRef>, SheetError> {
        let start = Instant::now();
        let result = self.inner.list_sheets().await;
        Self::log("list_sheets", "", start, &result);
        result
    }

    async fn create_sheet(&self, title: &str, grid: GridSize) -> Result<SheetRef, SheetError> {
        let start = Instant::now();
        let result = self.inner.create_sheet(title, grid).await;
        Self::log("create_sheet", title, start, &result);
        result
    }

    async fn read_cell(&self, sheet: &SheetRef, cell: CellRef) -> Result<String, SheetError> {
        let start = Instant::now();
        let result = self.inner.read_cell(sheet, cell).await;
        Self::log("read_cell", &format!("{}!{cell}", sheet.title), start, &result);
        result
    }

    async fn write_range(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), SheetError> {
        let start = Instant::now();
        let result = self.inner.write_range(sheet, range, rows).await;
        Self::log("write_range", &format!("{}!{range}", sheet.title), start, &result);
        result
    }

    async fn set_formatting(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        style: &CellStyle,
    ) -> Result<(), SheetError> {
        let start = Instant::now();
        let result = self.inner.set_formatting(sheet, range, style).await;
        Self::log("set_formatting", &format!("{}!{range}", sheet.title), start, &result);
        result
    }

    async fn set_conditional_format(
        &self,
        sheet: &SheetRef,
        rule: &ConditionalRule,
    ) -> Result<(), SheetError> {
        let start = Instant::now();
        let result = self.inner.set_conditional_format(sheet, rule).await;
        Self::log(
            "set_conditional_format",
            &format!("{}!{}", sheet.title, rule.range),
            start,
            &result,
        );
        result
    }

    async fn merge_cells(&self, sheet: &SheetRef, range: RangeRef) -> Result<(), SheetError> {
        let start = Instant::now();
        let result = self.inner.merge_cells(sheet, range).await;
        Self::log("merge_cells", &format!("{}!{range}", sheet.title), start, &result);
        result
    }

    async fn set_right_to_left(&self, sheet: &SheetRef) -> Result<(), SheetError> {
        let start = Instant::now();
        let result = self.inner.set_right_to_left(sheet).await;
        Self::log("set_right_to_left", &sheet.title, start, &result);
        result
    }
}
