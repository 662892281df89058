//! Core module: grade aggregation, semester persistence and configuration

pub mod aggregator;
pub mod config;
pub mod editor;
pub mod models;
pub mod profiles;
pub mod report;
pub mod storage;
pub mod store;

/// Returns the current version of the `WizScholar` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
