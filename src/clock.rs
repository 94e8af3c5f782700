use core::fmt::Write;

use heapless::String;

use crate::{Error, Result};

/// A 24-hour wall-clock time.
///
/// Values built through [`TimeOfDay::new`] are always in range. The edit
/// buffer also uses this type and may briefly hold an out-of-range hour while
/// digits are being typed; [`TimeOfDay::is_valid`] tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub const NOON: TimeOfDay = TimeOfDay {
        hour: 12,
        minute: 0,
        second: 0,
    };

    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        let time = Self {
            hour,
            minute,
            second,
        };
        time.validate()?;
        Ok(time)
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidTime {
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            })
        }
    }

    /// Moves forward one second, carrying into minutes and hours and
    /// wrapping to midnight after 23:59:59.
    pub fn tick(&mut self) {
        if self.second > 58 {
            self.second = 0;
            self.add_minute();
        } else {
            self.second += 1;
        }
    }

    /// Minute past 58 wraps to 0 and carries an hour; hour past 22 wraps to 0.
    fn add_minute(&mut self) {
        if self.minute > 58 {
            self.minute = 0;
            if self.hour > 22 {
                self.hour = 0;
            } else {
                self.hour += 1;
            }
        } else {
            self.minute += 1;
        }
    }

    /// `HH:MM:SS`, the form every display layer shows.
    pub fn to_text(&self) -> String<8> {
        let mut text = String::new();
        // Fields are clamped below 100, so the 8 bytes always fit and the
        // write cannot fail.
        write!(
            text,
            "{:02}:{:02}:{:02}",
            self.hour % 100,
            self.minute % 100,
            self.second % 100
        )
        .ok();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_fields() {
        assert!(TimeOfDay::new(23, 59, 59).is_ok());
        assert_eq!(
            TimeOfDay::new(24, 0, 0),
            Err(Error::InvalidTime {
                hour: 24,
                minute: 0,
                second: 0
            })
        );
        assert!(TimeOfDay::new(0, 60, 0).is_err());
        assert!(TimeOfDay::new(0, 0, 60).is_err());
    }

    #[test]
    fn tick_carries_into_minute_and_hour() {
        let mut t = TimeOfDay::new(9, 59, 59).unwrap();
        t.tick();
        assert_eq!(t, TimeOfDay::new(10, 0, 0).unwrap());

        let mut t = TimeOfDay::new(10, 14, 59).unwrap();
        t.tick();
        assert_eq!(t, TimeOfDay::new(10, 15, 0).unwrap());
    }

    #[test]
    fn tick_wraps_at_midnight() {
        let mut t = TimeOfDay::new(23, 59, 59).unwrap();
        t.tick();
        assert_eq!(t, TimeOfDay::default());
    }

    #[test]
    fn a_full_day_of_ticks_stays_in_range_and_returns_to_start() {
        let start = TimeOfDay::NOON;
        let mut t = start;
        for _ in 0..24 * 60 * 60 {
            t.tick();
            assert!(t.is_valid(), "{t:?}");
        }
        assert_eq!(t, start);
    }

    #[test]
    fn text_is_zero_padded() {
        assert_eq!(TimeOfDay::new(7, 5, 3).unwrap().to_text().as_str(), "07:05:03");
        assert_eq!(TimeOfDay::NOON.to_text().as_str(), "12:00:00");
    }

    #[test]
    fn text_of_out_of_range_fields_keeps_two_digits_each() {
        let typed = TimeOfDay {
            hour: 29,
            minute: 7,
            second: 0,
        };
        assert_eq!(typed.to_text().as_str(), "29:07:00");
        let wild = TimeOfDay {
            hour: 255,
            minute: 160,
            second: 199,
        };
        assert_eq!(wild.to_text().as_str(), "55:60:99");
    }
}
