//! GeekOTP firmware - nRF52840 + S140 SoftDevice.
//!
//! Task layout:
//!
//! - `ui_task`: buttons → debounce → menu → OTP refresh → OLED, every tick
//! - `sampler_task`: die temperature once per second
//! - `notifier_task`: "Update #n" over BLE every few seconds
//! - `ble_task`: advertise, serve GATT writes, report link changes
//! - `softdevice_task`: SoftDevice event pump
//!
//! The UI task owns navigation state and the OTP cache; everything other
//! tasks produce reaches it through `SHARED` (whole-value slots) or the
//! `LINK_EVENTS` channel.

#![no_std]
#![no_main]

mod ble;
mod hw;

use core::mem;

use defmt::{info, warn};
use embassy_executor::{SpawnError, Spawner};
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};
use geekotp::build_info::BUILD_UNIX_TIME;
use geekotp::config::{DEVICE_NAME, FIRMWARE_VERSION, MAIN_LOOP_TICK_MS, OTP_SECRET};
use geekotp::ui::menu::{MenuModel, DEFAULT_MENU};
use geekotp::{BleError, Device, DeviceShared, Error, LinkEvent, SharedCell, Totp, WallClock};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::{LinkCell, Server};
use crate::hw::buttons::Buttons;
use crate::hw::display::{self, OledPanel};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static SHARED: DeviceShared<CriticalSectionRawMutex> = DeviceShared::new();
static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, 4> = Channel::new();
static LINK: LinkCell = SharedCell::new(None);

type Panel = OledPanel<Twim<'static, TWISPI0>>;

/// Log a boot-time configuration error and halt.
fn fatal(what: &str, err: impl defmt::Format) -> ! {
    defmt::panic!("{}: {}", what, err)
}

fn spawned(what: &str, result: Result<(), SpawnError>) {
    if let Err(e) = result {
        fatal(what, e);
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    ble::server::run(sd, server, &SHARED, &LINK, LINK_EVENTS.sender()).await
}

#[embassy_executor::task]
async fn notifier_task(server: &'static Server) -> ! {
    ble::notifier::run(server, &SHARED, &LINK).await
}

#[embassy_executor::task]
async fn sampler_task(sd: &'static Softdevice) -> ! {
    hw::sampler::run(sd, &SHARED).await
}

#[embassy_executor::task]
async fn ui_task(mut device: Device<Totp>, mut panel: Panel, buttons: Buttons<'static>) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(MAIN_LOOP_TICK_MS));
    loop {
        let now = Instant::now().as_millis();

        while let Ok(event) = LINK_EVENTS.try_receive() {
            device.handle_link_event(event, now);
        }

        let status = SHARED.snapshot(device.link_up());
        let report = device.tick(buttons.sample(), now, &status, &mut panel);
        if let Some(t) = report.transition {
            info!("UI: now {} (selected {})", t.state, t.selected);
        }
        if let Some(e) = report.error() {
            warn!("UI: tick failed: {}", e);
        }

        ticker.next().await;
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_cfg_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_cfg_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("{} v{} starting", DEVICE_NAME, FIRMWARE_VERSION);

    // Priorities 0, 1 and 4 belong to the SoftDevice.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    // ── SoftDevice + GATT server ──────────────────────────────────────────
    let sd = Softdevice::enable(&softdevice_config());
    static SERVER: StaticCell<Server> = StaticCell::new();
    let server: &'static Server = match Server::new(sd) {
        Ok(server) => SERVER.init(server),
        Err(e) => {
            warn!("GATT: {}", e);
            fatal("GATT register", Error::from(BleError::RegisterFailed))
        }
    };
    let sd: &'static Softdevice = sd;
    spawned("softdevice", spawner.spawn(softdevice_task(sd)));

    // ── Display + buttons ─────────────────────────────────────────────────
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let panel = match display::init(i2c) {
        Ok(panel) => panel,
        Err(e) => fatal("display init", e),
    };
    let buttons = Buttons::new(p.P0_11.degrade(), p.P0_12.degrade());

    let device = Device::new(
        Totp::default(),
        MenuModel::new(&DEFAULT_MENU),
        OTP_SECRET,
        WallClock::new(BUILD_UNIX_TIME, Instant::now().as_millis()),
    );

    spawned("ui", spawner.spawn(ui_task(device, panel, buttons)));
    spawned("sampler", spawner.spawn(sampler_task(sd)));
    spawned("notifier", spawner.spawn(notifier_task(server)));
    spawned("ble", spawner.spawn(ble_task(sd, server)));

    info!("Boot complete, clock seeded at {}", BUILD_UNIX_TIME);
}
