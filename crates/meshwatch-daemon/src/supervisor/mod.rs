mod cancellation;
mod core;
pub(crate) mod state;
mod stats;

pub use cancellation::CancellationToken;
pub use core::Watchdog;
pub use stats::WatchdogStats;
