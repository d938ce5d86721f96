//! Line-oriented serial logger
//!
//! Records are formatted with `ufmt` and pushed byte by byte to any
//! embedded-hal serial port. Never call these from a task: they block until
//! the whole line is out.

use crate::error::Error;
use crate::hal::timer::TimerConfig;
use embedded_hal::serial::Write;
use ufmt::{uWrite, uwrite};

pub struct SerialLogger<W> {
    port: W,
}

impl<W: Write<u8>> SerialLogger<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    /// `[<tag>] <message>`
    pub fn log_event(&mut self, tag: &str, message: &str) -> Result<(), W::Error> {
        uwrite!(self, "[{}] {}\r\n", tag, message)?;
        self.flush()
    }

    /// `[timer] divider=<n> top=<t>`
    pub fn log_timer_config(&mut self, config: &TimerConfig) -> Result<(), W::Error> {
        uwrite!(
            self,
            "[timer] divider={} top={}\r\n",
            config.divider.factor(),
            config.top
        )?;
        self.flush()
    }

    pub fn log_error(&mut self, error: &Error) -> Result<(), W::Error> {
        uwrite!(self, "[error] {:?}\r\n", error)?;
        self.flush()
    }

    pub fn release(self) -> W {
        self.port
    }

    fn flush(&mut self) -> Result<(), W::Error> {
        nb::block!(self.port.flush())
    }
}

impl<W: Write<u8>> uWrite for SerialLogger<W> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            nb::block!(self.port.write(byte))?;
        }
        Ok(())
    }
}
