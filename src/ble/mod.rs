//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GATT server**: one vendor service with a read/write inbox, an
//!    "Update #n" notify characteristic and a write-only clock.
//! 2. **Connection handler** (`server`): advertises, accepts one central,
//!    runs the GATT event loop and re-advertises after disconnect.
//! 3. **Notifier** (`notifier`): pushes a counter message every few
//!    seconds to whoever is connected.
//!
//! Communication with the main loop goes through the statics in `main.rs`:
//! the inbox slot in `DeviceShared` and the `LinkEvent` channel.

pub mod notifier;
pub mod server;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use geekotp::config::{DEVICE_NAME, INBOX_CAPACITY, NOTIFY_CAPACITY, SERVICE_UUID_LE};
use geekotp::SharedCell;
use heapless::Vec;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
};
use nrf_softdevice::ble::Connection;

/// Live connection published by the connection handler for the notifier.
pub type LinkCell = SharedCell<CriticalSectionRawMutex, Option<Connection>>;

/// GeekOTP vendor service.
///
/// UUIDs must stay in sync with `geekotp::config`.
#[nrf_softdevice::gatt_service(uuid = "7a11d3b2-b506-4e3a-a8e1-dd8b4a3f1c22")]
pub struct GeekService {
    /// Last payload written by the central, readable back.
    #[characteristic(uuid = "a2bae829-317a-443e-a03c-72e83149a52a", read, write, write_without_response)]
    pub inbox: Vec<u8, INBOX_CAPACITY>,

    /// "Update #n" notifications.
    #[characteristic(uuid = "4f3551a5-a935-4228-b791-b7904b4239ac", read, notify)]
    pub update: Vec<u8, NOTIFY_CAPACITY>,

    /// Unix time (seconds, little-endian u64) pushed by the central.
    #[characteristic(uuid = "4f3551a6-a935-4228-b791-b7904b4239ac", write)]
    pub clock: u64,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub geek: GeekService,
}

/// Flags + complete local name.
pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .full_name(DEVICE_NAME)
    .build();

/// Scan response: the 128-bit service UUID.
pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_128(ServiceList::Complete, &[SERVICE_UUID_LE])
    .build();
