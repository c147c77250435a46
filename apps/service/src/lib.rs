//! Single-target site monitoring: periodic HTTP probes persisted to a local
//! status log.

pub mod config;
pub mod database;
pub mod monitoring;
pub mod pool;

pub use config::Config;
pub use database::{LibsqlStatusStore, StatusRecord, StatusStore, StoreError};
pub use monitoring::{Checker, HttpChecker, MonitoringScheduler, Probe, ProbeError};
