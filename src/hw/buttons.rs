//! GPIO button input.
//!
//! Two physical buttons (active-low with internal pull-up):
//!   - NAVIGATE - move the menu cursor
//!   - SELECT   - enter the highlighted item / go back
//!
//! The pins are polled once per main-loop tick; debouncing happens in
//! `geekotp::ui::debounce` against the same uptime the tick uses.

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use geekotp::ui::debounce::RawSamples;

pub struct Buttons<'d> {
    navigate: Input<'d>,
    select: Input<'d>,
}

impl<'d> Buttons<'d> {
    pub fn new(navigate: AnyPin, select: AnyPin) -> Self {
        Self {
            navigate: Input::new(navigate, Pull::Up),
            select: Input::new(select, Pull::Up),
        }
    }

    /// Current pin levels, inverted so `true` means pressed.
    pub fn sample(&self) -> RawSamples {
        RawSamples {
            navigate: self.navigate.is_low(),
            select: self.select.is_low(),
        }
    }
}
