#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod alerts;
pub mod api;
pub mod config;
pub mod policy;
pub mod probe;
pub mod process;
pub mod supervisor;

pub use alerts::{AlertDispatcher, AlertSink, HttpAlertSink, LogOnlySink};
pub use api::{router, serve, AppState};
pub use config::{
    AlertsConfig, ApiConfig, PolicyConfig, ServiceDescriptor, WatchdogConfig,
};
pub use probe::{HealthProber, ProbeOutcome};
pub use process::{ProcessHandle, ProcessManager};
pub use supervisor::{CancellationToken, Watchdog, WatchdogStats};
