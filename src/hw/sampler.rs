//! Die temperature sampler.
//!
//! The TEMP peripheral belongs to the SoftDevice while it is enabled, so
//! readings go through the SoftDevice API.

use defmt::{debug, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Ticker};
use geekotp::config::SAMPLER_PERIOD_SECS;
use geekotp::{DeviceShared, Error};
use nrf_softdevice::Softdevice;

pub fn read_celsius(sd: &Softdevice) -> Result<i32, Error> {
    let temp = nrf_softdevice::temperature_celsius(sd).map_err(|_| Error::Sensor)?;
    Ok(temp.to_num::<i32>())
}

pub async fn run(sd: &'static Softdevice, shared: &'static DeviceShared<CriticalSectionRawMutex>) -> ! {
    let mut ticker = Ticker::every(Duration::from_secs(SAMPLER_PERIOD_SECS));
    loop {
        match read_celsius(sd) {
            Ok(celsius) => {
                let sample = shared.record_sample(celsius);
                debug!("Sensor: {}C (#{})", sample.celsius, sample.sequence);
            }
            // Previous sample stays; retried next period.
            Err(e) => warn!("Sensor: read failed: {}", e),
        }
        ticker.next().await;
    }
}
