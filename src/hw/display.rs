//! SSD1306 OLED display wrapper.
//!
//! Exposes the panel as a grid of text rows so the projector can address
//! it with `(col, row)` cells.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use geekotp::config::{DISPLAY_WIDTH_PX, FONT_WIDTH_PX, ROW_HEIGHT_PX};
use geekotp::{Error, TextPanel};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct OledPanel<I2C> {
    display: Display<I2C>,
    style: MonoTextStyle<'static, BinaryColor>,
}

/// Initialise the SSD1306 display and blank it.
pub fn init<I2C>(i2c: I2C) -> Result<OledPanel<I2C>, Error>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().map_err(|_| Error::Display)?;
    display.clear_buffer();
    display.flush().map_err(|_| Error::Display)?;

    Ok(OledPanel {
        display,
        style: MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .build(),
    })
}

fn row_top(row: u8) -> i32 {
    i32::from(row) * ROW_HEIGHT_PX as i32
}

impl<I2C> TextPanel for OledPanel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Error = Error;

    fn clear(&mut self) -> Result<(), Error> {
        self.display.clear_buffer();
        Ok(())
    }

    fn clear_line(&mut self, row: u8) -> Result<(), Error> {
        Rectangle::new(
            Point::new(0, row_top(row)),
            Size::new(DISPLAY_WIDTH_PX, ROW_HEIGHT_PX),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(&mut self.display)
        .map_err(|_| Error::Display)
    }

    fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), Error> {
        let origin = Point::new(i32::from(col) * FONT_WIDTH_PX as i32, row_top(row));
        Text::with_baseline(text, origin, self.style, Baseline::Top)
            .draw(&mut self.display)
            .map(|_| ())
            .map_err(|_| Error::Display)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.display.flush().map_err(|_| Error::Display)
    }
}
