//! Monthly ledger sheets
//!
//! One worksheet per calendar month. Income rows live in columns A–D,
//! expense rows in E–H; the next free row of each block is kept in L1/L2.

mod allocator;
mod error;
pub mod layout;
mod store;
mod types;

pub use allocator::RowAllocator;
pub use error::LedgerError;
pub use store::LedgerStore;
pub use types::{Amount, Categories, Category, Entry, EntryDraft, EntryKind, LedgerSheet, Period};
