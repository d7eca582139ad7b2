//! Time sources for TOTP verification
//!
//! Verification needs "now" as Unix seconds. Reading the wall clock directly
//! would make verification untestable, so it is injected through the
//! [`TimeSource`] trait instead.

use std::time::{SystemTime, UNIX_EPOCH};

/// Provider of the current Unix time in seconds
pub trait TimeSource: Send + Sync {
    /// Current time as seconds since the Unix epoch
    fn now_unix(&self) -> u64;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_unix(&self) -> u64 {
        // A clock set before the epoch reads as 0 rather than failing
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Time source frozen at a fixed Unix timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl TimeSource for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_unix(&self) -> u64 {
        (**self).now_unix()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now_unix(&self) -> u64 {
        (**self).now_unix()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now_unix(&self) -> u64 {
        (**self).now_unix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(59);
        assert_eq!(clock.now_unix(), 59);
        assert_eq!((&clock).now_unix(), 59);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_unix() > 1_577_836_800);
    }

    #[test]
    fn test_boxed_time_source() {
        let clock: Box<dyn TimeSource> = Box::new(FixedClock(1_111_111_109));
        assert_eq!(clock.now_unix(), 1_111_111_109);
    }
}
