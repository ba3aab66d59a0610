//! Ledger domain types

use crate::sheets::{CellValue, SheetRef};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Which column block an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Income, EntryKind::Expense];
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Income => write!(f, "income"),
            EntryKind::Expense => write!(f, "expense"),
        }
    }
}

/// A calendar month; one ledger sheet each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Worksheet title, `MM-YYYY`
    pub fn sheet_name(self) -> String {
        format!("{:02}-{:04}", self.month, self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sheet_name())
    }
}

/// Strictly positive, finite amount
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member of one kind's category list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allowed category names per entry kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    income: Vec<String>,
    expense: Vec<String>,
}

impl Categories {
    pub fn new(income: Vec<String>, expense: Vec<String>) -> Self {
        Self { income, expense }
    }

    pub fn for_kind(&self, kind: EntryKind) -> &[String] {
        match kind {
            EntryKind::Income => &self.income,
            EntryKind::Expense => &self.expense,
        }
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::new(
            ["אחר", "משכורת", "מתנה", "החזר"].map(String::from).to_vec(),
            ["רכב", "אוכל", "תרומה", "אחר", "החזרים"]
                .map(String::from)
                .to_vec(),
        )
    }
}

/// A fully collected entry waiting to be dated and written
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub name: String,
    pub amount: Amount,
    pub category: Category,
}

impl EntryDraft {
    pub fn dated(&self, date: NaiveDate) -> Entry {
        Entry {
            date,
            name: self.name.clone(),
            amount: self.amount,
            category: self.category.clone(),
        }
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    pub name: String,
    pub amount: Amount,
    pub category: Category,
}

impl Entry {
    /// Cells in column order: date, name, amount, category
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.date.format("%d-%m-%Y").to_string()),
            CellValue::Text(self.name.clone()),
            CellValue::Number(self.amount.value()),
            CellValue::Text(self.category.as_str().to_string()),
        ]
    }
}

/// A bootstrapped worksheet for one period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSheet {
    pub period: Period,
    pub sheet: SheetRef,
}
