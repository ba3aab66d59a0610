//! User-facing text

use crate::ledger::{Amount, Category, EntryKind};

pub const INCOME_LABEL: &str = "הכנסה";
pub const EXPENSE_LABEL: &str = "הוצאה";

pub const KIND_PROMPT: &str = "בחר פעולה: הכנסה או הוצאה";
pub const INVALID_KIND: &str = "בחירה לא חוקית, נסה שוב.";
pub const INVALID_AMOUNT: &str = "סכום לא חוקי. נא להזין ערך מספרי.";
pub const INVALID_CATEGORY: &str = "סוג לא חוקי, נא לבחור מהרשימה.";
pub const CANCELLED: &str = "רישום בוטל.";
pub const STORE_FAILURE: &str = "אירעה שגיאה ברישום. ניתן לבחור את הסוג שוב כדי לנסות שוב.";
pub const NO_SESSION: &str = "שלח /start כדי להתחיל רישום חדש.";
pub const NOTHING_TO_CANCEL: &str = "אין רישום פעיל לביטול.";
pub const STILL_RECORDING: &str = "הרישום הקודם עדיין בתהליך, נא להמתין.";

pub fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Income => INCOME_LABEL,
        EntryKind::Expense => EXPENSE_LABEL,
    }
}

pub fn kind_from_label(text: &str) -> Option<EntryKind> {
    EntryKind::ALL
        .into_iter()
        .find(|kind| kind_label(*kind) == text)
}

pub fn kind_choices() -> Vec<String> {
    EntryKind::ALL
        .iter()
        .map(|kind| kind_label(*kind).to_string())
        .collect()
}

/// Definite noun used inside prompts
fn noun(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Income => "ההכנסה",
        EntryKind::Expense => "ההוצאה",
    }
}

pub fn name_prompt(kind: EntryKind) -> String {
    format!("נא להזין את שם {}.", noun(kind))
}

pub fn amount_prompt(kind: EntryKind) -> String {
    format!("נא להזין את סכום {}.", noun(kind))
}

pub fn category_prompt(kind: EntryKind) -> String {
    format!("נא לבחור את סוג {}.", noun(kind))
}

pub fn confirmation(kind: EntryKind, amount: Amount, category: &Category) -> String {
    format!("{} של {amount} ({category}) נרשמה בהצלחה.", kind_label(kind))
}
