use core::fmt;
use ufmt::derive::uDebug;

/// Configuration defects detected while programming the timer.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A zero-cycle tick cannot produce a TOP value.
    TickTooShort { cycles: u32 },
    /// TOP does not fit the 16-bit ICR register, even without prescaling.
    TickTooLong { cycles: u32 },
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TickTooShort { cycles } => {
                write!(f, "tick of {} cycles is too short", cycles)
            }
            Error::TickTooLong { cycles } => {
                write!(f, "tick of {} cycles exceeds the 16-bit timer range", cycles)
            }
        }
    }
}
