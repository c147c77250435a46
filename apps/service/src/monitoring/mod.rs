/// Monitoring engine - probes the target and schedules periodic checks
///
/// This module is responsible for:
/// - Executing a single HTTP/HTTPS check and classifying its outcome
/// - Driving checks on a fixed cadence and persisting each observation
pub mod checker;
pub mod scheduler;
pub mod types;

pub use checker::{Checker, HttpChecker, ProbeError};
pub use scheduler::MonitoringScheduler;
pub use types::Probe;
