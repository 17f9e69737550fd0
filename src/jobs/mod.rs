//! Background jobs, run by the worker binary or on demand over HTTP.

pub mod startup_sync;

pub use startup_sync::{StartupSync, SyncSummary};
