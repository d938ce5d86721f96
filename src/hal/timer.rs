//! Timer/Counter driver: prescaler selection and overflow dispatch.
//!
//! The driver programs a 16-bit counter so that one overflow happens every
//! requested number of CPU cycles, and forwards each overflow to an attached
//! [`OverflowHandler`]. All configuration writes happen inside a critical
//! section, so the overflow interrupt never sees a half-updated TOP value or
//! handler.

use crate::config::MIN_TOP_VALUE;
use crate::error::{Error, Result};
use ufmt::derive::uDebug;

/// Clock prescaler settings. Discriminants are the CSn2:0 bit patterns.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Divider {
    /// Candidates tried by [`select_divider`], coarsest first.
    pub const COARSEST_FIRST: [Divider; 4] =
        [Divider::Div1024, Divider::Div256, Divider::Div64, Divider::Div8];

    /// CPU cycles per counter increment. `Stop` has no clock.
    pub const fn factor(self) -> u32 {
        match self {
            Divider::Stop => 0,
            Divider::Direct => 1,
            Divider::Div8 => 8,
            Divider::Div64 => 64,
            Divider::Div256 => 256,
            Divider::Div1024 => 1024,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Divider and TOP value for one tick.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub divider: Divider,
    pub top: u16,
}

impl TimerConfig {
    /// CPU cycles between two overflows.
    pub const fn cycles(&self) -> u32 {
        self.divider.factor() * (self.top as u32 + 1)
    }
}

/// Picks the coarsest prescaler that divides `cycles` exactly and still
/// leaves TOP >= 3, otherwise runs the counter on the undivided clock.
pub fn select_divider(cycles: u32) -> Result<TimerConfig> {
    if cycles == 0 {
        return Err(Error::TickTooShort { cycles });
    }

    let min_cycles = |factor: u32| factor * (MIN_TOP_VALUE as u32 + 1);
    let chosen = Divider::COARSEST_FIRST
        .iter()
        .copied()
        .find(|d| cycles >= min_cycles(d.factor()) && cycles % d.factor() == 0)
        .unwrap_or(Divider::Direct);

    let top = cycles / chosen.factor() - 1;
    let top = u16::try_from(top).map_err(|_| Error::TickTooLong { cycles })?;
    Ok(TimerConfig { divider: chosen, top })
}

/// Register-level access to a hardware timer.
///
/// Implementations only touch registers; sequencing and interrupt
/// suppression are the driver's job.
pub trait TimerPeripheral {
    /// Selects the clock source. `Divider::Stop` halts the counter.
    fn set_divider(&mut self, divider: Divider);
    /// Sets the counter value at which an overflow occurs.
    fn set_top(&mut self, top: u16);
    fn reset_counter(&mut self);
    /// Acknowledges any pending overflow flag.
    fn clear_overflow(&mut self);
    fn enable_overflow_interrupt(&mut self);
    fn disable_overflow_interrupt(&mut self);
}

/// Receives one call per counter overflow, from interrupt context.
pub trait OverflowHandler {
    fn on_overflow(&mut self);
}

impl OverflowHandler for fn() {
    #[inline]
    fn on_overflow(&mut self) {
        (*self)()
    }
}

pub struct TimerDriver<T, H> {
    timer: T,
    config: TimerConfig,
    handler: Option<H>,
    running: bool,
}

impl<T: TimerPeripheral, H: OverflowHandler> TimerDriver<T, H> {
    /// Takes ownership of the peripheral and leaves its clock stopped.
    pub fn new(mut timer: T) -> Self {
        timer.set_divider(Divider::Stop);
        Self {
            timer,
            config: TimerConfig { divider: Divider::Stop, top: 0 },
            handler: None,
            running: false,
        }
    }

    /// Programs the timer for `cycles` CPU cycles per overflow and installs
    /// `handler`. On error the previous configuration stays in place and the
    /// counter is left stopped.
    pub fn configure(&mut self, cycles: u32, handler: H, start: bool) -> Result<()> {
        critical_section::with(|_| {
            self.halt();
            let config = select_divider(cycles)?;
            self.config = config;
            self.handler = Some(handler);
            self.stop();
            if start {
                self.restart();
            }
            Ok(())
        })
    }

    /// Starts counting from zero with the stored configuration.
    pub fn restart(&mut self) {
        critical_section::with(|_| {
            self.stop();
            if self.config.divider == Divider::Stop {
                return;
            }
            self.timer.set_divider(self.config.divider);
            self.timer.enable_overflow_interrupt();
            self.running = true;
        })
    }

    /// Halts the counter and rewinds it so the next restart begins a full
    /// tick. The overflow interrupt stays enabled for that restart.
    pub fn stop(&mut self) {
        critical_section::with(|_| {
            self.halt();
            self.timer.set_top(self.config.top);
            self.timer.reset_counter();
            self.timer.clear_overflow();
            self.timer.enable_overflow_interrupt();
        })
    }

    /// Replaces the overflow handler, returning the previous one.
    pub fn attach(&mut self, handler: H) -> Option<H> {
        critical_section::with(|_| self.handler.replace(handler))
    }

    /// Overflow interrupt body: forwards to the attached handler, nothing else.
    #[inline]
    pub fn on_overflow(&mut self) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_overflow();
        }
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    pub fn peripheral(&self) -> &T {
        &self.timer
    }

    /// Stops the timer, masks its interrupt and hands the peripheral back.
    pub fn release(mut self) -> T {
        critical_section::with(|_| {
            self.halt();
            self.timer.disable_overflow_interrupt();
        });
        self.timer
    }

    fn halt(&mut self) {
        self.timer.set_divider(Divider::Stop);
        self.running = false;
    }
}
