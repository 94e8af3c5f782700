use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The time lock was requested while this context already held it.
    /// The store cannot make progress safely after this.
    #[error("time lock is already held by this context")]
    LockHeld,

    #[error("{hour:02}:{minute:02}:{second:02} is not a valid time of day")]
    InvalidTime { hour: u8, minute: u8, second: u8 },
}

impl Error {
    /// Fatal errors end the task that hit them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::LockHeld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lock_failures_are_fatal() {
        assert!(Error::LockHeld.is_fatal());
        let invalid = Error::InvalidTime {
            hour: 24,
            minute: 0,
            second: 0,
        };
        assert!(!invalid.is_fatal());
        assert_eq!(invalid.to_string(), "24:00:00 is not a valid time of day");
    }
}
