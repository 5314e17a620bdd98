pub use meshwatch_types::DEFAULT_API_PORT;

/// Seconds between full evaluation cycles of the supervisor loop.
pub const DEFAULT_TICK_SECS: u64 = 30;

/// Hard timeout for a single health probe.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Minimum elapsed time between two restart attempts for one service.
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// Restart attempts allowed before the policy gives up.
pub const DEFAULT_MAX_RESTARTS: u32 = 3;

/// Consecutive healthy probes required before the restart budget re-arms.
/// A single healthy response after a restart is often a false recovery.
pub const DEFAULT_HEALTHY_STREAK: u32 = 3;

/// Grace period between SIGTERM and SIGKILL when stopping a process.
pub const DEFAULT_STOP_GRACE_SECS: u64 = 5;

/// Timeout for delivering one alert to the relay.
pub const DEFAULT_ALERT_TIMEOUT_SECS: u64 = 5;
