//! OTP refresh engine.
//!
//! While the code screen is up, the main loop calls
//! [`RefreshEngine::maybe_refresh`] every tick. The engine recomputes at
//! most once per refresh interval regardless of the tick rate, and reports
//! the code line and the countdown line as changed independently so the
//! projector only repaints what actually moved.

pub mod base32;
pub mod totp;

use core::fmt::Write;

use heapless::String;

use crate::config::{OTP_PERIOD_SECS, OTP_REFRESH_INTERVAL_MS};
use crate::error::OtpError;
pub use totp::{CodeGenerator, Totp};

/// Raw zero-padded digits from the generator.
pub type Digits = String<10>;

/// Display form, e.g. `"123-456"`.
pub type Code = String<11>;

/// Insert a dash in the middle of `digits` for readability.
pub fn format_code(digits: &str) -> Code {
    let mut code = Code::new();
    let split = digits.len() / 2;
    for (i, c) in digits.chars().enumerate() {
        if i == split && split > 0 {
            let _ = code.push('-');
        }
        let _ = code.push(c);
    }
    code
}

/// Seconds until the current code expires, in `1..=period_secs`.
pub fn remaining_secs(unix_secs: u64, period_secs: u64) -> u8 {
    let period = period_secs.max(1);
    (period - unix_secs % period).min(u64::from(u8::MAX)) as u8
}

/// Last values the projector put on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtpCache {
    code: Option<Code>,
    remaining: Option<u8>,
    last_compute_ms: Option<u64>,
}

impl OtpCache {
    pub const fn new() -> Self {
        Self {
            code: None,
            remaining: None,
            last_compute_ms: None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn remaining(&self) -> Option<u8> {
        self.remaining
    }

    pub fn last_compute_ms(&self) -> Option<u64> {
        self.last_compute_ms
    }

    /// Forget everything so the next refresh runs immediately and reports
    /// both lines as changed.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }
}

/// Which lines changed on this refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshOutcome {
    pub code_changed: bool,
    pub remaining_changed: bool,
}

impl RefreshOutcome {
    pub fn any(&self) -> bool {
        self.code_changed || self.remaining_changed
    }
}

/// Rate-limited, diff-aware wrapper around a [`CodeGenerator`].
pub struct RefreshEngine<G> {
    generator: G,
    period_secs: u64,
    interval_ms: u64,
    cache: OtpCache,
}

impl<G: CodeGenerator> RefreshEngine<G> {
    pub fn new(generator: G) -> Self {
        Self::with_timing(generator, OTP_PERIOD_SECS, OTP_REFRESH_INTERVAL_MS)
    }

    pub fn with_timing(generator: G, period_secs: u64, interval_ms: u64) -> Self {
        Self {
            generator,
            period_secs,
            interval_ms,
            cache: OtpCache::new(),
        }
    }

    pub fn cache(&self) -> &OtpCache {
        &self.cache
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Recompute if the refresh interval has elapsed.
    ///
    /// On a generator error the cached lines are left as they were; the
    /// attempt time is still recorded so the retry happens on the next
    /// eligible tick rather than on every tick.
    pub fn maybe_refresh(
        &mut self,
        now_ms: u64,
        unix_secs: u64,
        secret: &str,
    ) -> Result<RefreshOutcome, OtpError> {
        if let Some(last) = self.cache.last_compute_ms {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return Ok(RefreshOutcome::default());
            }
        }
        self.cache.last_compute_ms = Some(now_ms);

        let digits = self.generator.generate(secret, unix_secs)?;
        let code = format_code(&digits);
        let remaining = remaining_secs(unix_secs, self.period_secs);

        let outcome = RefreshOutcome {
            code_changed: self.cache.code.as_ref() != Some(&code),
            remaining_changed: self.cache.remaining != Some(remaining),
        };

        if outcome.code_changed {
            debug!("OTP: new code, {}s left", remaining);
            self.cache.code = Some(code);
        }
        self.cache.remaining = Some(remaining);

        Ok(outcome)
    }
}

/// Countdown line text, e.g. `"Next in: 17s"`.
pub fn countdown_line(remaining: Option<u8>) -> String<16> {
    let mut line = String::new();
    match remaining {
        Some(secs) => {
            let _ = write!(line, "Next in: {}s", secs);
        }
        None => {
            let _ = line.push_str("Next in: --");
        }
    }
    line
}
