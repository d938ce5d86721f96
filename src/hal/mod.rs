pub mod timer;

#[cfg(target_arch = "avr")]
mod tc1;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
pub use timer::{
    select_divider, Divider, OverflowHandler, TimerConfig, TimerDriver, TimerPeripheral,
};
#[cfg(target_arch = "avr")]
pub use uart::Uart;
