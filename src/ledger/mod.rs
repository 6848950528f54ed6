//! Ledger snapshot container, calendar helpers, and invariant checks.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod month;
pub mod validate;

pub use ledger::Ledger;
pub use month::Month;
pub use validate::{amounts_match, validate_ledger, AMOUNT_TOLERANCE};
