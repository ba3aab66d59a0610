use crate::sheets::SheetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Backend unreachable, or sheet state needs manual repair
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),
    /// A row was allocated but could not be recorded
    #[error("Ledger write failed: {0}")]
    WriteFailed(String),
}

impl LedgerError {
    pub fn unavailable(e: &SheetError) -> Self {
        LedgerError::StoreUnavailable(e.to_string())
    }

    pub fn write_failed(e: &SheetError) -> Self {
        LedgerError::WriteFailed(e.to_string())
    }
}
