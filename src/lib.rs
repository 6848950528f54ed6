#![doc(test(attr(deny(warnings))))]

//! Tuition Core is the financial computation engine behind a school
//! collections workflow: invoice aging, revenue recognition, receivables
//! analytics and payment allocation over an in-memory ledger snapshot,
//! plus an AI collaborator for reminders and cash flow forecasts.

pub mod config;
pub mod core;
pub mod demo;
pub mod domain;
pub mod errors;
pub mod insight;
pub mod ledger;
pub mod snapshot;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tuition Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
