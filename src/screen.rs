//! MAX7219 matrix behind the [`DisplaySink`] interface.

use keypad_clock::clock::TimeOfDay;
use keypad_clock::display::{Cursor, DisplaySink, Layer, Panel, Position};
use max7219::connectors::SpiConnectorSW;
use max7219::MAX7219;
use rp_pico::hal::gpio::bank0::{Gpio16, Gpio17, Gpio18, Gpio19};
use rp_pico::hal::gpio::{FunctionSioOutput, FunctionSpi, Pin, PullDown};
use rp_pico::hal::pac::SPI0;
use rp_pico::hal::spi::{Enabled, Spi};
use rtic::Mutex;

pub type Spi0 = Spi<
    Enabled,
    SPI0,
    (
        Pin<Gpio19, FunctionSpi, PullDown>,
        Pin<Gpio16, FunctionSpi, PullDown>,
        Pin<Gpio18, FunctionSpi, PullDown>,
    ),
>;
pub type CsPin = Pin<Gpio17, FunctionSioOutput, PullDown>;
pub type Driver = MAX7219<SpiConnectorSW<Spi0, CsPin>>;

/// Layered panel mirrored onto the chained matrix after every change.
pub struct Screen {
    panel: Panel,
    driver: Driver,
}

impl Screen {
    pub fn new(driver: Driver) -> Self {
        let mut screen = Self {
            panel: Panel::new(),
            driver,
        };
        screen.flush();
        screen
    }

    fn flush(&mut self) {
        let frame = self.panel.frame();
        for (dev_idx, rows) in frame.iter().enumerate() {
            if self.driver.write_raw(dev_idx, rows).is_err() {
                defmt::warn!("matrix write failed on device {}", dev_idx);
            }
        }
    }

    pub fn blink(&mut self) {
        if self.panel.toggle_blink() {
            self.flush();
        }
    }
}

impl DisplaySink for Screen {
    fn render_time(&mut self, at: Position, layer: Layer, time: TimeOfDay) {
        self.panel.render_time(at, layer, time);
        self.flush();
    }

    fn set_cursor(&mut self, at: Position, layer: Layer, cursor: Cursor) {
        self.panel.set_cursor(at, layer, cursor);
        self.flush();
    }

    fn show_layer(&mut self, layer: Layer) {
        self.panel.show_layer(layer);
        self.flush();
    }

    fn hide_layer(&mut self, layer: Layer) {
        self.panel.hide_layer(layer);
        self.flush();
    }
}

/// Takes the RTIC lock around every call so several tasks can draw.
pub struct Locked<L>(pub L);

impl<L: Mutex<T = Screen>> DisplaySink for Locked<L> {
    fn render_time(&mut self, at: Position, layer: Layer, time: TimeOfDay) {
        self.0.lock(|screen| screen.render_time(at, layer, time))
    }

    fn set_cursor(&mut self, at: Position, layer: Layer, cursor: Cursor) {
        self.0.lock(|screen| screen.set_cursor(at, layer, cursor))
    }

    fn show_layer(&mut self, layer: Layer) {
        self.0.lock(|screen| screen.show_layer(layer))
    }

    fn hide_layer(&mut self, layer: Layer) {
        self.0.lock(|screen| screen.hide_layer(layer))
    }
}
