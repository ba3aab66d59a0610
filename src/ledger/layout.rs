//! Fixed worksheet layout and the one-time bootstrap payload
//!
//! Cell positions here are a compatibility contract with existing sheets.

use super::EntryKind;
use crate::sheets::{
    BooleanCondition, CellRef, CellStyle, CellValue, Color, ConditionalRule, GridSize, RangeRef,
};

/// Rows 1–2 hold titles and headers
pub const FIRST_DATA_ROW: u32 = 3;

/// Date, name, amount, category
pub const ENTRY_WIDTH: u32 = 4;

pub const GRID: GridSize = GridSize {
    rows: 1000,
    columns: 12,
};

const COL_A: u32 = 0;
const COL_E: u32 = 4;
const COL_I: u32 = 8;
const COL_J: u32 = 9;
const COL_K: u32 = 10;
const COL_L: u32 = 11;

pub const INCOME_TOTAL: CellRef = CellRef::new(COL_I, 2);
pub const EXPENSE_TOTAL: CellRef = CellRef::new(COL_J, 2);
pub const BALANCE: CellRef = CellRef::new(COL_K, 2);

const INCOME_TITLE: &str = "הכנסות";
const EXPENSE_TITLE: &str = "הוצאות";
const BALANCE_TITLE: &str = "סה\"כ";
const HEADERS: [&str; 4] = ["תאריך", "שם", "סכום", "סוג"];

fn block_start(kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Income => COL_A,
        EntryKind::Expense => COL_E,
    }
}

/// Cell holding the next free row for `kind` (L1 income, L2 expense)
pub fn counter_cell(kind: EntryKind) -> CellRef {
    match kind {
        EntryKind::Income => CellRef::new(COL_L, 1),
        EntryKind::Expense => CellRef::new(COL_L, 2),
    }
}

/// The four cells of `kind`'s block on `row`
pub fn entry_range(kind: EntryKind, row: u32) -> RangeRef {
    RangeRef::row_span(CellRef::new(block_start(kind), row), ENTRY_WIDTH)
}

/// One write or formatting call made when a sheet is first created
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapStep {
    Write {
        range: RangeRef,
        rows: Vec<Vec<CellValue>>,
    },
    Merge(RangeRef),
    ConditionalFormat(ConditionalRule),
    RightToLeft,
    Format {
        range: RangeRef,
        style: CellStyle,
    },
}

fn write_cell(cell: CellRef, value: CellValue) -> BootstrapStep {
    BootstrapStep::Write {
        range: RangeRef::cell(cell),
        rows: vec![vec![value]],
    }
}

fn header_row(kind: EntryKind) -> BootstrapStep {
    BootstrapStep::Write {
        range: entry_range(kind, 2),
        rows: vec![HEADERS.iter().map(|h| CellValue::text(*h)).collect()],
    }
}

/// Everything written to a fresh sheet, in order. Counters come last so a
/// half-finished bootstrap is detectable as a missing counter.
pub fn bootstrap_steps() -> Vec<BootstrapStep> {
    let income_title = CellRef::new(COL_A, 1);
    let expense_title = CellRef::new(COL_E, 1);
    let start_row = CellValue::Number(f64::from(FIRST_DATA_ROW));

    let mut steps = vec![
        write_cell(income_title, CellValue::text(INCOME_TITLE)),
        BootstrapStep::Merge(RangeRef::row_span(income_title, ENTRY_WIDTH)),
        write_cell(expense_title, CellValue::text(EXPENSE_TITLE)),
        BootstrapStep::Merge(RangeRef::row_span(expense_title, ENTRY_WIDTH)),
        header_row(EntryKind::Income),
        header_row(EntryKind::Expense),
        write_cell(CellRef::new(COL_I, 1), CellValue::text(INCOME_TITLE)),
        write_cell(INCOME_TOTAL, CellValue::formula("=SUM(C3:C)")),
        write_cell(CellRef::new(COL_J, 1), CellValue::text(EXPENSE_TITLE)),
        write_cell(EXPENSE_TOTAL, CellValue::formula("=SUM(G3:G)")),
        write_cell(CellRef::new(COL_K, 1), CellValue::text(BALANCE_TITLE)),
        write_cell(BALANCE, CellValue::formula("=I2-J2")),
        BootstrapStep::ConditionalFormat(ConditionalRule {
            range: RangeRef::cell(BALANCE),
            condition: BooleanCondition::NumberLess("0".to_string()),
            background: Color::RED,
        }),
        BootstrapStep::ConditionalFormat(ConditionalRule {
            range: RangeRef::cell(BALANCE),
            condition: BooleanCondition::NumberGreater("0".to_string()),
            background: Color::GREEN,
        }),
        BootstrapStep::RightToLeft,
    ];

    for col in [COL_A, COL_E, COL_I, COL_J, COL_K] {
        steps.push(BootstrapStep::Format {
            range: RangeRef::cell(CellRef::new(col, 1)),
            style: CellStyle::bold(),
        });
    }
    steps.push(BootstrapStep::Format {
        range: RangeRef::new(CellRef::new(COL_A, 1), CellRef::new(COL_K, GRID.rows)),
        style: CellStyle::centered(),
    });

    for kind in EntryKind::ALL {
        steps.push(write_cell(counter_cell(kind), start_row.clone()));
    }
    steps
}
