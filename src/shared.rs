//! Cross-task device state.
//!
//! Background tasks (sampler, notifier, BLE write receiver) each own one
//! slot here and only ever replace it as a whole value. Readers take a
//! copy under the same lock, so they can never see a half-written value.
//! Navigation state and the OTP cache are not here: they belong to the
//! main loop alone.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

use crate::config::INBOX_CAPACITY;

/// Last payload a BLE central wrote to the read/write characteristic.
pub type Inbox = Vec<u8, INBOX_CAPACITY>;

/// Single-writer / multi-reader cell with whole-value replace semantics.
pub struct SharedCell<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T: Clone> SharedCell<M, T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Swap in a new value.
    pub fn replace(&self, value: T) {
        self.inner.lock(|cell| {
            *cell.borrow_mut() = value;
        });
    }

    /// Copy out the current value.
    pub fn get(&self) -> T {
        self.inner.lock(|cell| cell.borrow().clone())
    }

    /// Inspect the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }
}

/// Most recent sensor reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    /// Die temperature in whole degrees Celsius.
    pub celsius: i32,
    /// Number of successful samples so far; 0 means no reading yet.
    pub sequence: u32,
}

/// Messages from BLE callbacks into the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A central connected.
    Connected,
    /// The central went away; advertising resumes.
    Disconnected,
    /// A central pushed the current Unix time.
    ClockSet(u64),
}

/// What the status page shows; read once per main-loop tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub sensor: SensorSample,
    pub connected: bool,
    pub inbox: Inbox,
    pub notifications: u32,
}

/// Slots written by background tasks.
pub struct DeviceShared<M: RawMutex> {
    inbox: SharedCell<M, Inbox>,
    sensor: SharedCell<M, SensorSample>,
    notifications: AtomicU32,
}

impl<M: RawMutex> DeviceShared<M> {
    pub const fn new() -> Self {
        Self {
            inbox: SharedCell::new(Vec::new()),
            sensor: SharedCell::new(SensorSample {
                celsius: 0,
                sequence: 0,
            }),
            notifications: AtomicU32::new(0),
        }
    }

    /// Write receiver: replace the inbox with `payload`.
    ///
    /// Payloads longer than the inbox keep their first `INBOX_CAPACITY` bytes.
    /// Returns the number of bytes kept.
    pub fn record_write(&self, payload: &[u8]) -> usize {
        let kept = payload.len().min(INBOX_CAPACITY);
        let mut inbox = Inbox::new();
        let _ = inbox.extend_from_slice(&payload[..kept]);
        self.inbox.replace(inbox);
        kept
    }

    pub fn inbox(&self) -> Inbox {
        self.inbox.get()
    }

    /// Sampler: publish a new reading.
    pub fn record_sample(&self, celsius: i32) -> SensorSample {
        let sequence = self.sensor.with(|s| s.sequence).wrapping_add(1);
        let sample = SensorSample { celsius, sequence };
        self.sensor.replace(sample);
        sample
    }

    pub fn sensor(&self) -> SensorSample {
        self.sensor.get()
    }

    /// Notifier: publish the counter value just used.
    pub fn publish_notification_count(&self, count: u32) {
        self.notifications.store(count, Ordering::Relaxed);
    }

    pub fn notification_count(&self) -> u32 {
        self.notifications.load(Ordering::Relaxed)
    }

    /// Everything the status page needs, copied out slot by slot.
    pub fn snapshot(&self, connected: bool) -> StatusSnapshot {
        StatusSnapshot {
            sensor: self.sensor(),
            connected,
            inbox: self.inbox(),
            notifications: self.notification_count(),
        }
    }
}

impl<M: RawMutex> Default for DeviceShared<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::thread;

    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    use super::*;

    #[test]
    fn write_replaces_wholesale() {
        let shared: DeviceShared<NoopRawMutex> = DeviceShared::new();
        shared.record_write(&[0x10, 0x20, 0x30, 0x40]);
        shared.record_write(&[0x01, 0x02]);
        assert_eq!(shared.inbox().as_slice(), &[0x01, 0x02]);
    }

    #[test]
    fn oversized_write_is_truncated() {
        let shared: DeviceShared<NoopRawMutex> = DeviceShared::new();
        let payload = [0xAB; INBOX_CAPACITY + 8];
        assert_eq!(shared.record_write(&payload), INBOX_CAPACITY);
        assert_eq!(shared.inbox().len(), INBOX_CAPACITY);
    }

    #[test]
    fn starts_empty() {
        let shared: DeviceShared<NoopRawMutex> = DeviceShared::new();
        let snap = shared.snapshot(false);
        assert!(snap.inbox.is_empty());
        assert_eq!(snap.sensor, SensorSample::default());
        assert_eq!(snap.notifications, 0);
    }

    #[test]
    fn sample_sequence_advances() {
        let shared: DeviceShared<NoopRawMutex> = DeviceShared::new();
        assert_eq!(shared.record_sample(21).sequence, 1);
        assert_eq!(shared.record_sample(22).sequence, 2);
        assert_eq!(shared.sensor().celsius, 22);
    }

    #[test]
    fn concurrent_writes_are_never_mixed() {
        static SHARED: DeviceShared<CriticalSectionRawMutex> = DeviceShared::new();
        static DONE: AtomicBool = AtomicBool::new(false);

        let a: &[u8] = &[0x01, 0x02];
        let b: &[u8] = &[0x03, 0x04, 0x05, 0x06, 0x07];

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..20_000 {
                    SHARED.record_write(if i % 2 == 0 { a } else { b });
                }
            });
            s.spawn(|| {
                for _ in 0..20_000 {
                    SHARED.record_write(a);
                }
                DONE.store(true, Ordering::Release);
            });
            s.spawn(|| {
                while !DONE.load(Ordering::Acquire) {
                    let seen = SHARED.inbox();
                    assert!(
                        seen.is_empty() || seen.as_slice() == a || seen.as_slice() == b,
                        "torn read: {:?}",
                        seen
                    );
                }
            });
        });

        // The last writer only ever writes `a`, but the other may finish after it.
        let last = SHARED.inbox();
        assert!(last.as_slice() == a || last.as_slice() == b);
    }

    #[test]
    fn write_mid_tick_is_visible_next_tick() {
        let shared: DeviceShared<CriticalSectionRawMutex> = DeviceShared::new();
        let before = shared.snapshot(true);
        thread::scope(|s| {
            s.spawn(|| {
                shared.record_write(&[0x01, 0x02]);
            });
        });
        let after = shared.snapshot(true);
        assert!(before.inbox.is_empty());
        assert_eq!(after.inbox.as_slice(), &[0x01, 0x02]);
    }
}
