//! Periodic task scheduler driven by the timer overflow interrupt

use super::task::Task;
use crate::config::DEBUG_SLOWDOWN;
use crate::error::Result;
use crate::hal::timer::{OverflowHandler, TimerConfig, TimerDriver, TimerPeripheral};

/// Overflow handler installed by [`Scheduler::init`]: advances every task,
/// in slice order, once per tick.
pub struct Dispatcher<'a, F> {
    tasks: &'a mut [Task<F>],
    slowdown: u16,
    skipped: u16,
    ticks: u32,
}

impl<'a, F: FnMut()> Dispatcher<'a, F> {
    fn new(tasks: &'a mut [Task<F>], slowdown: u16) -> Self {
        Self {
            tasks,
            slowdown: slowdown.max(1),
            skipped: 0,
            ticks: 0,
        }
    }

    pub fn tasks(&self) -> &[Task<F>] {
        &*self.tasks
    }

    /// Ticks delivered to the tasks since the last `init`.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

impl<F: FnMut()> OverflowHandler for Dispatcher<'_, F> {
    fn on_overflow(&mut self) {
        self.skipped += 1;
        if self.skipped < self.slowdown {
            return;
        }
        self.skipped = 0;
        self.ticks = self.ticks.wrapping_add(1);
        for task in self.tasks.iter_mut() {
            task.advance_one_tick();
        }
    }
}

/// Owns the task set and the timer that drives it.
///
/// There is no global instance: the application keeps the scheduler (usually
/// in a `critical_section::Mutex`) and calls [`Scheduler::dispatch`] from the
/// timer's overflow interrupt.
pub struct Scheduler<'a, T, F = fn()> {
    driver: TimerDriver<T, Dispatcher<'a, F>>,
    slowdown: u16,
}

impl<'a, T: TimerPeripheral, F: FnMut()> Scheduler<'a, T, F> {
    pub fn new(timer: T) -> Self {
        Self {
            driver: TimerDriver::new(timer),
            slowdown: DEBUG_SLOWDOWN,
        }
    }

    /// Installs `tasks` and programs the timer for `cycles_per_tick` CPU
    /// cycles per tick. The task slice and timer setup are swapped together
    /// inside one critical section. Must not be called from a task.
    pub fn init(
        &mut self,
        tasks: &'a mut [Task<F>],
        cycles_per_tick: u32,
        start: bool,
    ) -> Result<()> {
        let slowdown = self.slowdown;
        critical_section::with(|_| {
            self.driver
                .configure(cycles_per_tick, Dispatcher::new(tasks, slowdown), start)
        })
    }

    /// Resumes ticking with the configuration from the last `init`.
    pub fn restart(&mut self) {
        self.driver.restart();
    }

    /// Halts ticking. No dispatch happens after this returns until the next
    /// `restart` or `init`.
    pub fn stop(&mut self) {
        self.driver.stop();
    }

    /// Overflow interrupt entry point.
    #[inline]
    pub fn dispatch(&mut self) {
        self.driver.on_overflow();
    }

    /// Simulates one timer overflow from main-line code.
    #[inline]
    pub fn test_tick(&mut self) {
        self.dispatch();
    }

    /// Only every `factor`-th overflow reaches the tasks. 0 and 1 disable
    /// the throttle. Debug aid; relative task timing is unchanged.
    pub fn set_slowdown(&mut self, factor: u16) {
        let factor = factor.max(1);
        self.slowdown = factor;
        critical_section::with(|_| {
            if let Some(dispatcher) = self.driver.handler_mut() {
                dispatcher.slowdown = factor;
                dispatcher.skipped = 0;
            }
        });
    }

    pub fn tasks(&self) -> &[Task<F>] {
        self.driver.handler().map(Dispatcher::tasks).unwrap_or(&[])
    }

    pub fn task(&self, index: usize) -> Option<&Task<F>> {
        self.tasks().get(index)
    }

    pub fn ticks(&self) -> u32 {
        self.driver.handler().map(Dispatcher::ticks).unwrap_or(0)
    }

    pub fn timer_config(&self) -> TimerConfig {
        self.driver.config()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Stops the timer and returns the peripheral.
    pub fn release(self) -> T {
        self.driver.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hal::timer::mock::MockTimer;
    use crate::hal::timer::Divider;
    use core::cell::{Cell, RefCell};

    fn noop() {}

    #[test]
    fn two_tasks_fire_on_expected_ticks() {
        let now = Cell::new(0u32);
        let log = RefCell::new(Vec::new());
        let a = || log.borrow_mut().push(('A', now.get()));
        let b = || log.borrow_mut().push(('B', now.get()));
        let mut tasks: [Task<&dyn Fn()>; 2] = [
            Task::new(&a as &dyn Fn(), 0, 3, true),
            Task::new(&b as &dyn Fn(), 2, 5, true),
        ];

        let mut scheduler = Scheduler::new(MockTimer::default());
        scheduler.set_slowdown(1);
        scheduler.init(&mut tasks, 1024, false).unwrap();
        for tick in 0..16 {
            now.set(tick);
            scheduler.test_tick();
        }

        let fired = |id: char| -> Vec<u32> {
            log.borrow().iter().filter(|(t, _)| *t == id).map(|(_, n)| *n).collect()
        };
        assert_eq!(fired('A'), vec![0, 3, 6, 9, 12, 15]);
        assert_eq!(fired('B'), vec![2, 7, 12]);
        // A is advanced before B within the same tick
        let at_12: Vec<char> = log
            .borrow()
            .iter()
            .filter(|(_, n)| *n == 12)
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(at_12, vec!['A', 'B']);
        assert_eq!(scheduler.ticks(), 16);
    }

    #[test]
    fn init_programs_timer_and_optionally_starts() {
        let mut tasks: [Task; 1] = [Task::new(noop as fn(), 0, 1, true)];
        let mut scheduler = Scheduler::new(MockTimer::default());

        scheduler.init(&mut tasks, 4096, true).unwrap();
        assert!(scheduler.is_running());
        assert_eq!(
            scheduler.timer_config(),
            TimerConfig { divider: Divider::Div1024, top: 3 }
        );
        assert_eq!(scheduler.tasks().len(), 1);
    }

    #[test]
    fn stop_and_restart_keep_configuration() {
        let mut tasks: [Task; 0] = [];
        let mut scheduler = Scheduler::new(MockTimer::default());
        scheduler.init(&mut tasks, 100_000, true).unwrap();
        let config = scheduler.timer_config();

        scheduler.stop();
        assert!(!scheduler.is_running());
        scheduler.restart();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.timer_config(), config);

        let timer = scheduler.release();
        assert_eq!(timer.last_divider(), Some(Divider::Stop));
        assert_eq!(timer.last_top(), Some(12_499));
    }

    #[test]
    fn invalid_tick_length_is_reported() {
        let mut tasks: [Task; 0] = [];
        let mut scheduler = Scheduler::new(MockTimer::default());
        assert_eq!(
            scheduler.init(&mut tasks, 0, true),
            Err(Error::TickTooShort { cycles: 0 })
        );
        assert!(!scheduler.is_running());
        assert!(scheduler.tasks().is_empty());
    }

    #[test]
    fn reinit_replaces_task_set() {
        let first = Cell::new(0u32);
        let second = Cell::new(0u32);
        let inc_first = || first.set(first.get() + 1);
        let inc_second = || second.set(second.get() + 1);
        let mut old: [Task<&dyn Fn()>; 1] = [Task::new(&inc_first as &dyn Fn(), 0, 1, true)];
        let mut new: [Task<&dyn Fn()>; 2] = [
            Task::new(&inc_second as &dyn Fn(), 0, 1, true),
            Task::new(&inc_second as &dyn Fn(), 0, 1, true),
        ];

        let mut scheduler = Scheduler::new(MockTimer::default());
        scheduler.set_slowdown(1);
        scheduler.init(&mut old, 256, true).unwrap();
        scheduler.test_tick();
        scheduler.init(&mut new, 256, true).unwrap();
        scheduler.test_tick();

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(scheduler.tasks().len(), 2);
        assert_eq!(scheduler.ticks(), 1);
    }

    #[test]
    fn slowdown_advances_every_nth_overflow() {
        let count = Cell::new(0u32);
        let inc = || count.set(count.get() + 1);
        let mut tasks: [Task<&dyn Fn()>; 1] = [Task::new(&inc as &dyn Fn(), 0, 1, true)];

        let mut scheduler = Scheduler::new(MockTimer::default());
        scheduler.set_slowdown(4);
        scheduler.init(&mut tasks, 256, true).unwrap();
        for _ in 0..12 {
            scheduler.dispatch();
        }
        assert_eq!(count.get(), 3);

        scheduler.set_slowdown(0);
        scheduler.dispatch();
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn tasks_can_be_toggled_through_the_scheduler() {
        let count = Cell::new(0u32);
        let inc = || count.set(count.get() + 1);
        let mut tasks: [Task<&dyn Fn()>; 1] = [Task::new(&inc as &dyn Fn(), 0, 1, true)];

        let mut scheduler = Scheduler::new(MockTimer::default());
        scheduler.set_slowdown(1);
        scheduler.init(&mut tasks, 256, true).unwrap();
        scheduler.test_tick();
        scheduler.task(0).unwrap().disable();
        scheduler.test_tick();
        scheduler.test_tick();
        scheduler.task(0).unwrap().enable();
        scheduler.test_tick();

        assert_eq!(count.get(), 2);
        assert!(scheduler.task(1).is_none());
    }

    #[test]
    fn dispatch_before_init_is_a_no_op() {
        let mut scheduler: Scheduler<'_, _> = Scheduler::new(MockTimer::default());
        scheduler.dispatch();
        assert_eq!(scheduler.ticks(), 0);
        assert!(scheduler.tasks().is_empty());
    }
}
