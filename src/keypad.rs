//! Key codes and the 4x4 matrix keypad.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub const CONFIRM_CODE: u8 = 0x11;
pub const CANCEL_CODE: u8 = 0x13;
pub const ENTER_EDIT_CODE: u8 = b'#';

/// Driver codes by matrix position. Letter keys report `0x11..=0x14`.
pub const LAYOUT: [[u8; 4]; 4] = [
    [b'1', b'2', b'3', 0x11],
    [b'4', b'5', b'6', 0x12],
    [b'7', b'8', b'9', 0x13],
    [b'*', b'0', b'#', 0x14],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyCode {
    /// Decimal value `0..=9`.
    Digit(u8),
    Confirm,
    Cancel,
    EnterEdit,
    Other(u8),
}

impl From<u8> for KeyCode {
    fn from(code: u8) -> Self {
        match code {
            b'0'..=b'9' => KeyCode::Digit(code - b'0'),
            CONFIRM_CODE => KeyCode::Confirm,
            CANCEL_CODE => KeyCode::Cancel,
            ENTER_EDIT_CODE => KeyCode::EnterEdit,
            other => KeyCode::Other(other),
        }
    }
}

/// Blocking source of key presses.
#[allow(async_fn_in_trait)]
pub trait KeySource {
    async fn receive(&mut self) -> KeyCode;
}

impl<M: RawMutex, const N: usize> KeySource for Receiver<'_, M, KeyCode, N> {
    async fn receive(&mut self) -> KeyCode {
        Receiver::receive(self).await
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Row-driven matrix scanner.
///
/// Rows idle high; each scan pulls one row low at a time and reads the
/// columns, which are pulled up and read low while a key bridges them.
pub struct Keypad<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    layout: [[u8; COLS]; ROWS],
    last: Option<(usize, usize)>,
    reported: Option<(usize, usize)>,
}

impl<R, C, const ROWS: usize, const COLS: usize> Keypad<R, C, ROWS, COLS>
where
    R: OutputPin<Error = Infallible>,
    C: InputPin<Error = Infallible>,
{
    pub fn new(mut rows: [R; ROWS], cols: [C; COLS], layout: [[u8; COLS]; ROWS]) -> Self {
        for row in rows.iter_mut() {
            infallible(row.set_high());
        }
        Self {
            rows,
            cols,
            layout,
            last: None,
            reported: None,
        }
    }

    /// First pressed key in row-major order.
    fn pressed(&mut self) -> Option<(usize, usize)> {
        let mut found = None;
        for (r, row) in self.rows.iter_mut().enumerate() {
            infallible(row.set_low());
            if found.is_none() {
                found = self
                    .cols
                    .iter()
                    .position(|col| infallible(col.is_low()))
                    .map(|c| (r, c));
            }
            infallible(row.set_high());
        }
        found
    }

    /// Runs one scan. A press is reported once, after it has been seen on
    /// two consecutive scans.
    pub fn scan(&mut self) -> Option<KeyCode> {
        let now = self.pressed();
        let stable = now == self.last;
        self.last = now;
        if !stable || now == self.reported {
            return None;
        }
        self.reported = now;
        now.map(|(r, c)| KeyCode::from(self.layout[r][c]))
    }
}
