//! Periodic BLE "Update #n" notifications.
//!
//! The counter lives inside the notifier task; each tick bumps it once
//! whether or not the push succeeds, so a failed push is superseded by the
//! next one instead of being retried.

use core::fmt::Write;

use heapless::String;

use crate::config::NOTIFY_CAPACITY;

pub type Message = String<NOTIFY_CAPACITY>;

/// Text pushed for notification number `n`.
pub fn update_message(n: u32) -> Message {
    let mut msg = Message::new();
    let _ = write!(msg, "Update #{}", n);
    msg
}

/// Initial readable value of the update characteristic: the die
/// temperature in whole degrees Celsius.
pub fn temperature_message(celsius: i32) -> Message {
    let mut msg = Message::new();
    let _ = write!(msg, "{}", celsius);
    msg
}

/// Monotonic notification counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotificationCounter {
    count: u32,
}

impl NotificationCounter {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Advance and return the new number with its message.
    pub fn next_message(&mut self) -> (u32, Message) {
        self.count = self.count.saturating_add(1);
        (self.count, update_message(self.count))
    }
}
