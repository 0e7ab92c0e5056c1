//! Wall-clock time derived from the monotonic uptime counter.
//!
//! The device has no battery-backed RTC. Unix time is reconstructed as a
//! base captured at build time (or pushed by a BLE central) plus the
//! uptime elapsed since that base was taken.

/// Unix time anchored to an uptime instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    base_unix_secs: u64,
    base_uptime_ms: u64,
}

impl WallClock {
    /// Anchor `unix_secs` at uptime `uptime_ms`.
    pub const fn new(unix_secs: u64, uptime_ms: u64) -> Self {
        Self {
            base_unix_secs: unix_secs,
            base_uptime_ms: uptime_ms,
        }
    }

    /// Re-anchor the clock, e.g. after a time-sync write.
    pub fn set(&mut self, unix_secs: u64, uptime_ms: u64) {
        self.base_unix_secs = unix_secs;
        self.base_uptime_ms = uptime_ms;
    }

    /// Unix seconds at uptime `now_ms`.
    ///
    /// Uptimes earlier than the anchor clamp to the anchor itself.
    pub fn unix_secs(&self, now_ms: u64) -> u64 {
        let elapsed_ms = now_ms.saturating_sub(self.base_uptime_ms);
        self.base_unix_secs.saturating_add(elapsed_ms / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_with_uptime() {
        let clock = WallClock::new(1_700_000_000, 2_000);
        assert_eq!(clock.unix_secs(2_000), 1_700_000_000);
        assert_eq!(clock.unix_secs(2_999), 1_700_000_000);
        assert_eq!(clock.unix_secs(3_000), 1_700_000_001);
        assert_eq!(clock.unix_secs(62_000), 1_700_000_060);
    }

    #[test]
    fn set_reanchors() {
        let mut clock = WallClock::new(0, 0);
        clock.set(1_000, 50_000);
        assert_eq!(clock.unix_secs(51_500), 1_001);
    }

    #[test]
    fn uptime_before_anchor_clamps() {
        let clock = WallClock::new(100, 10_000);
        assert_eq!(clock.unix_secs(0), 100);
    }

    #[test]
    fn huge_anchor_saturates() {
        let clock = WallClock::new(u64::MAX, 0);
        assert_eq!(clock.unix_secs(0), u64::MAX);
        assert_eq!(clock.unix_secs(5_000), u64::MAX);
        assert_eq!(clock.unix_secs(u64::MAX), u64::MAX);
    }
}
