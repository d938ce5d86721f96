//! Interrupt-driven periodic task scheduler for AVR ATmega microcontrollers.
//!
//! A fixed set of [`Task`]s is advanced once per tick from the Timer/Counter1
//! overflow interrupt. Each task fires every `period` ticks, optionally
//! stretched by a fractional correction so that periods which are not a
//! whole number of ticks run without drift.
//!
//! ```ignore
//! static SCHEDULER: Mutex<RefCell<Option<Scheduler<'static, TC1>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER1_OVF() {
//!     critical_section::with(|cs| {
//!         if let Some(scheduler) = SCHEDULER.borrow_ref_mut(cs).as_mut() {
//!             scheduler.dispatch();
//!         }
//!     });
//! }
//! ```
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod hal;
pub mod logger;
pub mod rtos;

pub use error::{Error, Result};
pub use hal::timer::{select_divider, Divider, TimerConfig, TimerDriver, TimerPeripheral};
pub use logger::SerialLogger;
pub use rtos::{Scheduler, Task};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
