//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Device

/// BLE advertised name and boot banner.
pub const DEVICE_NAME: &str = "GeekOTP";

/// Firmware version shown on the About page.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Timing

/// Main input/UI loop period (ms).
pub const MAIN_LOOP_TICK_MS: u64 = 20;

/// Minimum time between accepted transitions of one button (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 150;

/// Minimum time between two OTP recomputations (ms).
pub const OTP_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Sensor sampler period (seconds).
pub const SAMPLER_PERIOD_SECS: u64 = 1;

/// Delay before the first BLE notification, giving the stack time to settle (seconds).
pub const NOTIFY_SETTLE_SECS: u64 = 5;

/// Period of the BLE "Update #n" notification (seconds).
pub const NOTIFY_PERIOD_SECS: u64 = 10;

/// First pause after a failed advertising attempt (ms); doubles on each failure.
pub const ADVERTISE_RETRY_MS: u64 = 200;

/// Longest pause between advertising attempts (ms).
pub const ADVERTISE_RETRY_MAX_MS: u64 = 5_000;

// OTP

/// TOTP time step (seconds).
pub const OTP_PERIOD_SECS: u64 = 30;

/// Number of digits in a generated code.
pub const OTP_DIGITS: u32 = 6;

/// Pre-provisioned base32 TOTP secret.
///
/// Replace before flashing a real device.
pub const OTP_SECRET: &str = "JBSWY3DPEHPK3PXP";

/// Largest decoded secret (bytes) accepted by the TOTP generator.
pub const OTP_MAX_KEY_LEN: usize = 64;

// Clock

/// Latest unix time a clock write may set (2200-01-01T00:00:00Z).
///
/// Anything later is treated as a corrupt write and ignored.
pub const CLOCK_MAX_UNIX_SECS: u64 = 7_258_118_400;

// BLE GATT
//
// The GATT server macros in the firmware's `ble` module only take string
// literals, so the characteristic UUIDs live there. The service UUID is
// repeated here because the scan response carries its little-endian bytes.

pub const SERVICE_UUID: &str = "7a11d3b2-b506-4e3a-a8e1-dd8b4a3f1c22";

/// `SERVICE_UUID` in advertisement (little-endian) byte order.
pub const SERVICE_UUID_LE: [u8; 16] = [
    0x22, 0x1c, 0x3f, 0x4a, 0x8b, 0xdd, 0xe1, 0xa8, 0x3a, 0x4e, 0x06, 0xb5, 0xb2, 0xd3, 0x11, 0x7a,
];

/// Largest payload kept from a peer write to the read/write characteristic.
pub const INBOX_CAPACITY: usize = 32;

/// Largest notification payload ("Update #4294967295" fits).
pub const NOTIFY_CAPACITY: usize = 20;

// Display (SSD1306 128x64, FONT_6X10)

pub const DISPLAY_WIDTH_PX: u32 = 128;
pub const FONT_WIDTH_PX: u32 = 6;
pub const ROW_HEIGHT_PX: u32 = 14;

/// Text rows available on screen.
pub const DISPLAY_ROWS: u8 = 4;

/// Characters per text row.
pub const DISPLAY_COLS: usize = (DISPLAY_WIDTH_PX / FONT_WIDTH_PX) as usize;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button NAVIGATE → P0.11   (pull-up, active-low)
//   Button SELECT   → P0.12   (pull-up, active-low)
//   I²C SDA         → P0.26
//   I²C SCL         → P0.27

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => panic!("not lowercase hex"),
        }
    }

    #[test]
    fn service_uuid_bytes_match_string_form() {
        let digits: Vec<u8> = SERVICE_UUID.bytes().filter(|&c| c != b'-').collect();
        assert_eq!(digits.len(), 32);
        let mut be = [0u8; 16];
        for (i, pair) in digits.chunks(2).enumerate() {
            be[i] = (hex_nibble(pair[0]) << 4) | hex_nibble(pair[1]);
        }
        be.reverse();
        assert_eq!(be, SERVICE_UUID_LE);
    }

    #[test]
    fn notification_fits_capacity() {
        assert!("Update #4294967295".len() <= NOTIFY_CAPACITY);
    }

    #[test]
    fn clock_ceiling_is_after_build_era() {
        assert!(CLOCK_MAX_UNIX_SECS > 1_700_000_000);
        assert!(CLOCK_MAX_UNIX_SECS < u64::MAX / 2);
    }

    #[test]
    fn advertise_retry_is_bounded() {
        assert!(ADVERTISE_RETRY_MS > 0);
        assert!(ADVERTISE_RETRY_MS <= ADVERTISE_RETRY_MAX_MS);
        assert!(ADVERTISE_RETRY_MAX_MS < NOTIFY_PERIOD_SECS * 1_000);
    }

    #[test]
    fn display_fits_code_and_countdown() {
        assert_eq!(DISPLAY_COLS, 21);
        assert!("Next in: 30s".len() <= DISPLAY_COLS);
    }
}
