//! Unified error type for geekotp.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // UI / Display
    /// I²C transaction to the display failed.
    Display,

    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    // OTP
    /// The TOTP code could not be generated.
    Otp(OtpError),

    // Sensor
    /// The temperature sensor could not be read.
    Sensor,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GATT server registration failed at boot.
    RegisterFailed,
    /// Advertising could not start or ended with an error.
    AdvertiseFailed,
    /// No central is connected, so there is nobody to notify.
    NotConnected,
    /// The SoftDevice rejected the notification.
    NotifyFailed,
}

/// Reasons the TOTP collaborator can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OtpError {
    /// The secret decoded to zero bytes.
    EmptySecret,
    /// The secret contains a character outside the base32 alphabet.
    InvalidSecret,
    /// The decoded secret does not fit the key buffer.
    SecretTooLong,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl From<OtpError> for Error {
    fn from(e: OtpError) -> Self {
        Error::Otp(e)
    }
}
