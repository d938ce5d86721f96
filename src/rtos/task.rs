use core::sync::atomic::{AtomicBool, Ordering};

/// Whole scheduler ticks.
pub type Ticks = u32;
/// Sub-tick units used to spread a fractional period over several firings.
pub type PhaseSteps = u8;

/// A periodic job advanced once per tick by the scheduler.
///
/// The schedule fields are only touched by [`Task::advance_one_tick`], which
/// runs in the timer interrupt. `enabled` is the one flag shared with
/// main-line code; it is a single byte, so plain atomic loads/stores suffice.
pub struct Task<F = fn()> {
    execute: F,
    ticks_remaining: Ticks,
    period: Ticks,
    phase: PhaseSteps,
    phase_per_period: PhaseSteps,
    phase_steps_per_tick: PhaseSteps,
    enabled: AtomicBool,
}

impl<F: FnMut()> Task<F> {
    /// Integer-period task. `execute` first runs on advance number
    /// `first_execution + 1`, then every `period` advances.
    pub const fn new(execute: F, first_execution: Ticks, period: Ticks, enabled: bool) -> Self {
        Self::with_phase(execute, first_execution, period, 0, 0, enabled)
    }

    /// Fractional-period task: the average period is
    /// `period + phase_per_period / phase_steps_per_tick` ticks.
    /// A `phase_steps_per_tick` of 0 disables the correction.
    pub const fn with_phase(
        execute: F,
        first_execution: Ticks,
        period: Ticks,
        phase_per_period: PhaseSteps,
        phase_steps_per_tick: PhaseSteps,
        enabled: bool,
    ) -> Self {
        Self {
            execute,
            ticks_remaining: first_execution,
            period,
            phase: 0,
            phase_per_period,
            phase_steps_per_tick,
            enabled: AtomicBool::new(enabled),
        }
    }

    #[inline]
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Accounts for one elapsed tick. Returns true when the task was due,
    /// whether or not it is enabled.
    pub fn advance_one_tick(&mut self) -> bool {
        if self.ticks_remaining != 0 {
            self.ticks_remaining -= 1;
            return false;
        }

        // This tick is the first one of the next period. A zero period
        // behaves like a period of one and fires every tick.
        self.ticks_remaining = self.period.saturating_sub(1);
        if self.phase_steps_per_tick > 0 {
            // u16 so that phase + increment cannot wrap before the compare
            let mut phase = self.phase as u16 + self.phase_per_period as u16;
            let steps = self.phase_steps_per_tick as u16;
            while phase >= steps {
                phase -= steps;
                self.ticks_remaining = self.ticks_remaining.wrapping_add(1);
            }
            self.phase = phase as PhaseSteps;
        }

        if self.is_enabled() {
            (self.execute)();
        }
        true
    }

    pub fn ticks_remaining(&self) -> Ticks {
        self.ticks_remaining
    }

    pub fn period_ticks(&self) -> Ticks {
        self.period
    }

    pub fn phase_accumulator(&self) -> PhaseSteps {
        self.phase
    }
}
