//! TOTP code generator (RFC 6238 over RFC 4226 HOTP, HMAC-SHA1).

use core::fmt::Write;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::{base32, Digits};
use crate::config::{OTP_DIGITS, OTP_MAX_KEY_LEN, OTP_PERIOD_SECS};
use crate::error::OtpError;

type HmacSha1 = Hmac<Sha1>;

/// The TOTP collaborator: `(secret, time) → code`.
///
/// Implementations must be pure: the same inputs give the same code.
pub trait CodeGenerator {
    /// Generate the zero-padded numeric code for `unix_secs`.
    fn generate(&self, secret: &str, unix_secs: u64) -> Result<Digits, OtpError>;
}

/// HOTP value for `counter` truncated to `digits` decimal digits.
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<u32, OtpError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|_| OtpError::InvalidSecret)?;
    mac.update(&counter.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    // Dynamic truncation: low nibble of the last byte picks a 4-byte window.
    let offset = usize::from(hash[hash.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        hash[offset] & 0x7f,
        hash[offset + 1],
        hash[offset + 2],
        hash[offset + 3],
    ]);

    Ok(binary % 10u32.pow(digits))
}

/// Time-based generator with a fixed step and digit count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Totp {
    period_secs: u64,
    digits: u32,
}

impl Totp {
    /// `digits` is clamped to 1..=9 so the code fits a `u32`.
    pub const fn new(period_secs: u64, digits: u32) -> Self {
        let digits = if digits == 0 {
            1
        } else if digits > 9 {
            9
        } else {
            digits
        };
        Self {
            period_secs,
            digits,
        }
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }
}

impl Default for Totp {
    fn default() -> Self {
        Self::new(OTP_PERIOD_SECS, OTP_DIGITS)
    }
}

impl CodeGenerator for Totp {
    fn generate(&self, secret: &str, unix_secs: u64) -> Result<Digits, OtpError> {
        let mut key = [0u8; OTP_MAX_KEY_LEN];
        let len = base32::decode(secret, &mut key)?;

        let counter = unix_secs / self.period_secs.max(1);
        let value = hotp(&key[..len], counter, self.digits)?;

        let mut code = Digits::new();
        let _ = write!(code, "{:0width$}", value, width = self.digits as usize);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_KEY: &[u8] = b"12345678901234567890";
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn hotp_matches_rfc4226_vectors() {
        let expected = [
            755224, 287082, 359152, 969429, 338314, 254676, 287922, 162583, 399871, 520489,
        ];
        for (counter, want) in expected.iter().enumerate() {
            assert_eq!(hotp(RFC_KEY, counter as u64, 6).unwrap(), *want);
        }
    }

    #[test]
    fn totp_matches_rfc6238_sha1_vectors() {
        let totp = Totp::new(30, 8);
        let cases = [
            (59, "94287082"),
            (1_111_111_109, "07081804"),
            (1_111_111_111, "14050471"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
            (20_000_000_000, "65353130"),
        ];
        for (t, want) in cases {
            assert_eq!(totp.generate(RFC_SECRET, t).unwrap().as_str(), want);
        }
    }

    #[test]
    fn six_digit_codes_are_zero_padded() {
        let totp = Totp::default();
        assert_eq!(totp.generate(RFC_SECRET, 1_111_111_109).unwrap().as_str(), "081804");
        assert_eq!(totp.generate(RFC_SECRET, 1_234_567_890).unwrap().as_str(), "005924");
    }

    #[test]
    fn code_is_stable_within_a_step() {
        let totp = Totp::default();
        let a = totp.generate("JBSWY3DPEHPK3PXP", 1_700_000_010).unwrap();
        let b = totp.generate("JBSWY3DPEHPK3PXP", 1_700_000_019).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.bytes().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn malformed_secret_is_an_error() {
        let totp = Totp::default();
        assert_eq!(totp.generate("not base32!", 0), Err(OtpError::InvalidSecret));
        assert_eq!(totp.generate("", 0), Err(OtpError::EmptySecret));
    }

    #[test]
    fn digits_are_clamped() {
        assert_eq!(Totp::new(30, 0).generate(RFC_SECRET, 59).unwrap().len(), 1);
        assert_eq!(Totp::new(30, 12).generate(RFC_SECRET, 59).unwrap().len(), 9);
    }
}
