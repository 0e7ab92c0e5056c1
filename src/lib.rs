//! Library interface for GeekOTP.
//!
//! Everything that does not touch a peripheral lives here so it can be
//! tested on the host: debouncing, the menu state machine, the OTP refresh
//! engine, display projection and the cross-task shared state.
//!
//! Usage: `cargo test --lib` (host) or `cargo build --release --features embedded`
//! (nRF52840 firmware, see `main.rs`).
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main] and
//! brings its own `ble` and `hw` modules; it pulls the logic from this crate.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod backoff;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod notify;
pub mod otp;
pub mod shared;
pub mod ui;

/// Values captured by the build script.
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_time.rs"));
}

pub use backoff::Backoff;
pub use clock::WallClock;
pub use device::{Device, TickReport};
pub use error::{BleError, Error, OtpError};
pub use otp::{CodeGenerator, Totp};
pub use shared::{DeviceShared, LinkEvent, SharedCell, StatusSnapshot};
pub use ui::projector::TextPanel;
pub use ui::UiState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_is_plausible() {
        // Later than 2020-01-01.
        assert!(build_info::BUILD_UNIX_TIME > 1_577_836_800);
    }

    #[test]
    fn clock_seeded_from_build_time() {
        let clock = WallClock::new(build_info::BUILD_UNIX_TIME, 0);
        assert_eq!(clock.unix_secs(5_000), build_info::BUILD_UNIX_TIME + 5);
    }
}
