//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the supervisor runtime, passed to
//! [`Supervisor::builder`](crate::Supervisor::builder).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `max_fatals = 0` → clamped to 1 (a single attempt, no retry)

use std::time::Duration;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus channel size; publishers wait while it is full
/// - `max_fatals`: Run-loop crashes tolerated before a worker is abandoned
/// - `grace`: Maximum wait for run-loops to complete on shutdown and restart
///
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event intake channel.
    pub bus_capacity: usize,

    /// Number of run-loop attempts before a crashing worker is abandoned.
    ///
    /// Retries are immediate (no backoff). With the default of 3, a worker gets
    /// its initial attempt plus 2 retries.
    pub max_fatals: u32,

    /// Maximum time to wait for a stopped worker's run-loop to complete.
    ///
    /// Used by [`Supervisor::shutdown`](crate::Supervisor::shutdown) and
    /// [`Supervisor::restart_one`](crate::Supervisor::restart_one).
    pub grace: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the crash ceiling clamped to a minimum of 1.
    #[inline]
    pub fn max_fatals_clamped(&self) -> u32 {
        self.max_fatals.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 64`
    /// - `max_fatals = 3`
    /// - `grace = 60s`
    fn default() -> Self {
        Self {
            bus_capacity: 64,
            max_fatals: 3,
            grace: Duration::from_secs(60),
        }
    }
}
