//! Shared library for `WizScholar`
//!
//! Contains the grade aggregator and semester store used by the CLI, plus the
//! upload/summarize pipeline server and its client.

pub mod core;
pub mod logger;
pub mod pipeline;

pub use core::config;
pub use core::get_version;
