//! Connection handler - advertise, serve one central, repeat.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use geekotp::config::{ADVERTISE_RETRY_MAX_MS, ADVERTISE_RETRY_MS, NOTIFY_CAPACITY};
use geekotp::notify::temperature_message;
use geekotp::{Backoff, BleError, DeviceShared, Error, LinkEvent};
use heapless::Vec;
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::Softdevice;

use crate::ble::{GeekServiceEvent, LinkCell, Server, ServerEvent, ADV_DATA, SCAN_DATA};
use crate::hw::sampler;

pub type LinkEvents = Sender<'static, CriticalSectionRawMutex, LinkEvent, 4>;

/// Run the advertise/connect loop forever.
///
/// Writes to the inbox land in `shared`; connect, disconnect and clock
/// writes are forwarded to the main loop through `events`.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static Server,
    shared: &'static DeviceShared<CriticalSectionRawMutex>,
    link: &'static LinkCell,
    events: LinkEvents,
) -> ! {
    // Readable before the first notification goes out.
    let celsius = match sampler::read_celsius(sd) {
        Ok(celsius) => shared.record_sample(celsius).celsius,
        Err(_) => shared.sensor().celsius,
    };
    let seed = temperature_message(celsius);
    let seed: Vec<u8, NOTIFY_CAPACITY> = Vec::from_slice(seed.as_bytes()).unwrap_or_default();
    if server.geek.update_set(&seed).is_err() {
        warn!("BLE: could not seed update value");
    }

    let mut retry = Backoff::new(ADVERTISE_RETRY_MS, ADVERTISE_RETRY_MAX_MS);
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        info!("BLE: advertising");
        let conn = match peripheral::advertise_connectable(sd, adv, &peripheral::Config::default()).await {
            Ok(conn) => conn,
            Err(e) => {
                let delay = retry.next_delay_ms();
                warn!("BLE: {} ({}), retrying in {} ms", Error::from(BleError::AdvertiseFailed), e, delay);
                Timer::after(Duration::from_millis(delay)).await;
                continue;
            }
        };
        retry.reset();

        link.replace(Some(conn.clone()));
        events.send(LinkEvent::Connected).await;

        let reason = gatt_server::run(&conn, server, |e| match e {
            ServerEvent::Geek(GeekServiceEvent::InboxWrite(payload)) => {
                let kept = shared.record_write(&payload);
                info!("BLE: inbox <- {} bytes {=[u8]:x}", kept, payload.as_slice());
            }
            ServerEvent::Geek(GeekServiceEvent::UpdateCccdWrite { notifications }) => {
                info!("BLE: update notifications {}", notifications);
            }
            ServerEvent::Geek(GeekServiceEvent::ClockWrite(unix_secs)) => {
                if events.try_send(LinkEvent::ClockSet(unix_secs)).is_err() {
                    warn!("BLE: event queue full, clock write dropped");
                }
            }
        })
        .await;

        info!("BLE: disconnected: {}", reason);
        link.replace(None);
        events.send(LinkEvent::Disconnected).await;
    }
}
