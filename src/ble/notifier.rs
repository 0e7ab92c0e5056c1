//! Periodic "Update #n" notifier.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Ticker, Timer};
use geekotp::config::{NOTIFY_CAPACITY, NOTIFY_PERIOD_SECS, NOTIFY_SETTLE_SECS};
use geekotp::notify::NotificationCounter;
use geekotp::{BleError, DeviceShared};
use heapless::Vec;

use crate::ble::{LinkCell, Server};

/// Push `message` to the connected central. Returns the bytes sent.
fn push(server: &Server, link: &LinkCell, message: &str) -> Result<usize, BleError> {
    let value: Vec<u8, NOTIFY_CAPACITY> =
        Vec::from_slice(message.as_bytes()).map_err(|_| BleError::NotifyFailed)?;

    // Keep the readable value current even when nobody is subscribed.
    let _ = server.geek.update_set(&value);

    let conn = link.get().ok_or(BleError::NotConnected)?;
    server
        .geek
        .update_notify(&conn, &value)
        .map_err(|_| BleError::NotifyFailed)?;
    Ok(value.len())
}

/// Settle, then notify every period. Failed pushes are not retried.
pub async fn run(
    server: &'static Server,
    shared: &'static DeviceShared<CriticalSectionRawMutex>,
    link: &'static LinkCell,
) -> ! {
    Timer::after(Duration::from_secs(NOTIFY_SETTLE_SECS)).await;

    let mut counter = NotificationCounter::new();
    let mut ticker = Ticker::every(Duration::from_secs(NOTIFY_PERIOD_SECS));
    loop {
        let (n, message) = counter.next_message();
        shared.publish_notification_count(n);

        match push(server, link, &message) {
            Ok(bytes) => info!("Notify: #{} sent, {} bytes", n, bytes),
            Err(e) => warn!("Notify: #{} not sent: {}", n, e),
        }

        ticker.next().await;
    }
}
