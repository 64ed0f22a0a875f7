#![doc(test(attr(deny(warnings))))]

//! Workforce Core keeps an employee's working timeline: which workday applies
//! on any date, and how leave requests move from draft to approved leave in
//! the authoritative leave ledger.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Workforce Core tracing initialized.");
    });
}
