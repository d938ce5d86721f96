//! Configuration constants for the tick scheduler

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Tick length used when the application has no specific requirement.
/// Resolves to clkIO/64 with TOP = 3.
pub const DEFAULT_TICK_CYCLES: u32 = 256;

/// Smallest TOP value accepted for a prescaled clock
pub const MIN_TOP_VALUE: u16 = 3;

/// Dispatch throttle factor applied by `Scheduler::new`
#[cfg(feature = "debug")]
pub const DEBUG_SLOWDOWN: u16 = 256;
#[cfg(not(feature = "debug"))]
pub const DEBUG_SLOWDOWN: u16 = 1;

/// UART baud rate for the serial logger
pub const UART_BAUD: u32 = 9600;

/// CPU cycles in one tick for a tick rate of `tick_hz`.
///
/// Returns 0 when `tick_hz` is 0, which `select_divider` rejects.
pub const fn cycles_per_tick(cpu_hz: u32, tick_hz: u32) -> u32 {
    if tick_hz == 0 {
        0
    } else {
        cpu_hz / tick_hz
    }
}
