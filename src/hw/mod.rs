//! Board peripherals owned by the firmware: buttons, OLED and the die
//! temperature sampler.

pub mod buttons;
pub mod display;
pub mod sampler;
