//! Digit-by-digit time entry.
//!
//! [`Mode::transition`] is the whole acceptance table as a pure function of
//! the current mode and one key. [`Editor`] applies the resulting
//! [`Transition`] to the store and the display.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::clock::TimeOfDay;
use crate::display::{Cursor, DisplaySink, Layer, Position};
use crate::keypad::KeyCode;
use crate::store::TimeStore;
use crate::Result;

/// Digit position the next accepted key is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    HourTens,
    HourOnes,
    MinuteTens,
    MinuteOnes,
    SecondTens,
    SecondOnes,
}

impl Slot {
    /// Where the cursor goes after this slot is written. The last slot stays put.
    pub fn next(self) -> Slot {
        match self {
            Slot::HourTens => Slot::HourOnes,
            Slot::HourOnes => Slot::MinuteTens,
            Slot::MinuteTens => Slot::MinuteOnes,
            Slot::MinuteOnes => Slot::SecondTens,
            Slot::SecondTens => Slot::SecondOnes,
            Slot::SecondOnes => Slot::SecondOnes,
        }
    }

    /// Column offset from the start of `HH:MM:SS`.
    pub fn offset(self) -> u8 {
        match self {
            Slot::HourTens => 0,
            Slot::HourOnes => 1,
            Slot::MinuteTens => 3,
            Slot::MinuteOnes => 4,
            Slot::SecondTens => 6,
            Slot::SecondOnes => 7,
        }
    }

    pub fn accepts(self, digit: u8, buffer: &TimeOfDay) -> bool {
        match (self, digit) {
            (Slot::HourTens, 0..=2) => true,
            (Slot::HourOnes, 0..=3) => true,
            (Slot::HourOnes, 4..=9) => buffer.hour / 10 != 2,
            (Slot::MinuteTens | Slot::SecondTens, 0..=5) => true,
            (Slot::MinuteOnes | Slot::SecondOnes, 0..=9) => true,
            _ => false,
        }
    }

    fn write(self, digit: u8, time: &mut TimeOfDay) {
        let field = match self {
            Slot::HourTens | Slot::HourOnes => &mut time.hour,
            Slot::MinuteTens | Slot::MinuteOnes => &mut time.minute,
            Slot::SecondTens | Slot::SecondOnes => &mut time.second,
        };
        *field = match self {
            Slot::HourTens | Slot::MinuteTens | Slot::SecondTens => (*field % 10) + digit * 10,
            _ => (*field - *field % 10) + digit,
        };
    }
}

/// Working copy of the time being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditBuffer {
    pub time: TimeOfDay,
    pub cursor: Slot,
}

impl EditBuffer {
    pub fn new(snapshot: TimeOfDay) -> Self {
        Self {
            time: snapshot,
            cursor: Slot::HourTens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Display,
    Editing(EditBuffer),
}

/// Outcome of one key in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Start editing from a fresh snapshot.
    Begin,
    /// A digit was accepted; this is the updated buffer.
    Write(EditBuffer),
    Commit(TimeOfDay),
    Discard,
    /// Key not accepted here. Nothing changes and nothing is drawn.
    Ignore,
}

impl Mode {
    pub fn transition(&self, key: KeyCode) -> Transition {
        match (self, key) {
            (Mode::Display, KeyCode::EnterEdit) => Transition::Begin,
            (Mode::Display, _) => Transition::Ignore,
            // A tens digit written over a snapshot ones digit can leave the
            // hour at 24..=29; such a buffer cannot be committed.
            (Mode::Editing(buffer), KeyCode::Confirm) if buffer.time.is_valid() => {
                Transition::Commit(buffer.time)
            }
            (Mode::Editing(_), KeyCode::Cancel) => Transition::Discard,
            (Mode::Editing(buffer), KeyCode::Digit(digit))
                if buffer.cursor.accepts(digit, &buffer.time) =>
            {
                let mut next = *buffer;
                buffer.cursor.write(digit, &mut next.time);
                next.cursor = buffer.cursor.next();
                Transition::Write(next)
            }
            (Mode::Editing(_), _) => Transition::Ignore,
        }
    }
}

/// Keypad-driven time setter owning the edit buffer.
pub struct Editor {
    mode: Mode,
    origin: Position,
}

impl Editor {
    /// `origin` is where the buffer's `HH:MM:SS` is drawn on [`Layer::Edit`].
    pub fn new(origin: Position) -> Self {
        Self {
            mode: Mode::Display,
            origin,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    fn cursor_at(&self, slot: Slot) -> Position {
        Position::new(self.origin.row, self.origin.column + slot.offset())
    }

    fn draw<D: DisplaySink>(&self, buffer: &EditBuffer, display: &mut D) {
        display.render_time(self.origin, Layer::Edit, buffer.time);
        display.set_cursor(self.cursor_at(buffer.cursor), Layer::Edit, Cursor::BLINKING);
    }

    fn close<D: DisplaySink>(&mut self, display: &mut D) {
        display.set_cursor(self.cursor_at(Slot::HourTens), Layer::Edit, Cursor::HIDDEN);
        display.hide_layer(Layer::Edit);
        self.mode = Mode::Display;
    }

    /// Applies one key. Errors come only from the store and are fatal.
    pub fn handle<M, D>(
        &mut self,
        key: KeyCode,
        store: &TimeStore<M>,
        display: &mut D,
    ) -> Result<()>
    where
        M: RawMutex,
        D: DisplaySink,
    {
        match self.mode.transition(key) {
            Transition::Begin => {
                let buffer = EditBuffer::new(store.get()?);
                info!("editing from {}", buffer.time);
                display.show_layer(Layer::Edit);
                self.draw(&buffer, display);
                self.mode = Mode::Editing(buffer);
            }
            Transition::Write(buffer) => {
                self.draw(&buffer, display);
                self.mode = Mode::Editing(buffer);
            }
            Transition::Commit(time) => {
                store.set(time)?;
                info!("time set to {}", time);
                self.close(display);
            }
            Transition::Discard => {
                info!("edit discarded");
                self.close(display);
            }
            Transition::Ignore => {
                if let Mode::Editing(buffer) = &self.mode {
                    debug!("{} ignored {} at {}", buffer.cursor, key, buffer.time);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(hour: u8, minute: u8, second: u8) -> TimeOfDay {
        TimeOfDay::new(hour, minute, second).unwrap()
    }

    fn editing(cursor: Slot, time: TimeOfDay) -> Mode {
        Mode::Editing(EditBuffer { time, cursor })
    }

    fn written(mode: Mode, digit: u8) -> Option<EditBuffer> {
        match mode.transition(KeyCode::Digit(digit)) {
            Transition::Write(buffer) => Some(buffer),
            _ => None,
        }
    }

    fn accepted(slot: Slot, time: TimeOfDay) -> Vec<u8> {
        (0..=9).filter(|&d| written(editing(slot, time), d).is_some()).collect()
    }

    #[test]
    fn display_mode_only_reacts_to_enter_edit() {
        assert_eq!(Mode::Display.transition(KeyCode::EnterEdit), Transition::Begin);
        for key in [
            KeyCode::Digit(1),
            KeyCode::Confirm,
            KeyCode::Cancel,
            KeyCode::Other(b'*'),
        ] {
            assert_eq!(Mode::Display.transition(key), Transition::Ignore);
        }
    }

    #[test]
    fn acceptance_table() {
        let noon = TimeOfDay::NOON;
        assert_eq!(accepted(Slot::HourTens, noon), [0, 1, 2]);
        assert_eq!(accepted(Slot::HourOnes, time(13, 0, 0)), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(accepted(Slot::HourOnes, time(21, 0, 0)), [0, 1, 2, 3]);
        assert_eq!(accepted(Slot::MinuteTens, noon), [0, 1, 2, 3, 4, 5]);
        assert_eq!(accepted(Slot::MinuteOnes, noon), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(accepted(Slot::SecondTens, noon), [0, 1, 2, 3, 4, 5]);
        assert_eq!(accepted(Slot::SecondOnes, noon), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn hour_ones_four_rejected_after_tens_two() {
        let mode = editing(Slot::HourTens, time(12, 0, 0));
        let after_tens = written(mode, 2).unwrap();
        assert_eq!(after_tens.cursor, Slot::HourOnes);
        assert_eq!(Mode::Editing(after_tens).transition(KeyCode::Digit(4)), Transition::Ignore);
    }

    #[test]
    fn hour_ones_nine_accepted_after_tens_one() {
        let after_tens = written(editing(Slot::HourTens, TimeOfDay::NOON), 1).unwrap();
        let after_ones = written(Mode::Editing(after_tens), 9).unwrap();
        assert_eq!(after_ones.time.hour, 19);
        assert_eq!(after_ones.cursor, Slot::MinuteTens);
    }

    #[test]
    fn digits_replace_only_their_decimal_place() {
        let base = time(17, 48, 36);
        assert_eq!(written(editing(Slot::HourTens, base), 0).unwrap().time.hour, 7);
        assert_eq!(written(editing(Slot::MinuteOnes, base), 2).unwrap().time.minute, 42);
        assert_eq!(written(editing(Slot::SecondTens, base), 5).unwrap().time.second, 56);
    }

    #[test]
    fn cursor_walks_the_slots_and_stops_at_the_last() {
        let mut mode = editing(Slot::HourTens, time(0, 0, 0));
        let mut seen = Vec::new();
        for digit in [1, 2, 3, 4, 5, 6, 7] {
            let buffer = written(mode, digit).unwrap();
            seen.push(buffer.cursor);
            mode = Mode::Editing(buffer);
        }
        assert_eq!(
            seen,
            [
                Slot::HourOnes,
                Slot::MinuteTens,
                Slot::MinuteOnes,
                Slot::SecondTens,
                Slot::SecondOnes,
                Slot::SecondOnes,
                Slot::SecondOnes,
            ]
        );
        // The last write lands on the seconds ones digit.
        match mode {
            Mode::Editing(buffer) => assert_eq!(buffer.time, time(12, 34, 57)),
            Mode::Display => unreachable!(),
        }
    }

    #[test]
    fn confirm_and_cancel_work_from_any_slot() {
        let t = time(3, 4, 5);
        for slot in [Slot::HourTens, Slot::MinuteOnes, Slot::SecondOnes] {
            assert_eq!(editing(slot, t).transition(KeyCode::Confirm), Transition::Commit(t));
            assert_eq!(editing(slot, t).transition(KeyCode::Cancel), Transition::Discard);
        }
    }

    #[test]
    fn out_of_range_buffer_cannot_be_committed() {
        let buffer = written(editing(Slot::HourTens, time(19, 0, 0)), 2).unwrap();
        assert_eq!(buffer.time.hour, 29);
        let mode = Mode::Editing(buffer);
        assert_eq!(mode.transition(KeyCode::Confirm), Transition::Ignore);
        assert_eq!(mode.transition(KeyCode::Cancel), Transition::Discard);
    }

    #[test]
    fn unknown_keys_are_ignored_while_editing() {
        let mode = editing(Slot::MinuteTens, TimeOfDay::NOON);
        assert_eq!(mode.transition(KeyCode::EnterEdit), Transition::Ignore);
        assert_eq!(mode.transition(KeyCode::Other(0x12)), Transition::Ignore);
        assert_eq!(mode.transition(KeyCode::Digit(6)), Transition::Ignore);
    }
}
