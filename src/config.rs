//! Board, timing and screen layout constants.

use crate::clock::TimeOfDay;
use crate::display::Position;

pub const XTAL_FREQ_HZ: u32 = 12_000_000;

/// RTC alarm period driving [`crate::store::TimeStore::tick`].
pub const TICK_PERIOD_US: u32 = 1_000_000;

pub const SCAN_PERIOD_US: u32 = 20_000;
/// Keypad scans per cursor blink phase (500 ms).
pub const BLINK_SCANS: u16 = 25;

pub const DISPLAY_DEVICES: usize = 4;
pub const DISPLAY_INTENSITY: u8 = 0x0;
pub const SPI_BAUD_HZ: u32 = 2_000_000;

pub const KEY_QUEUE_DEPTH: usize = 4;

/// Where the running time is drawn.
pub const TIME_ORIGIN: Position = Position::new(1, 9);
/// Where the edit buffer is drawn.
pub const EDIT_ORIGIN: Position = Position::new(2, 9);

pub const INITIAL_TIME: TimeOfDay = TimeOfDay::NOON;
