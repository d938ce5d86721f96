#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use avr_device::atmega328p::{Peripherals, PORTB, TC1};
    use avr_tick_scheduler::config::{cycles_per_tick, CPU_FREQ_HZ};
    use avr_tick_scheduler::hal::Uart;
    use avr_tick_scheduler::{Scheduler, SerialLogger, Task};
    use core::cell::RefCell;
    use critical_section::Mutex;
    use panic_halt as _;

    const TICK_HZ: u32 = 1000;

    // PB5 drives the on-board LED, PB4 a second one
    const LED_HEARTBEAT: u8 = 1 << 5;
    const LED_FRACTIONAL: u8 = 1 << 4;

    static SCHEDULER: Mutex<RefCell<Option<Scheduler<'static, TC1>>>> =
        Mutex::new(RefCell::new(None));

    static mut TASKS: [Task; 2] = [
        // 2 Hz blink: toggle every 250 ticks
        Task::new(toggle_heartbeat as fn(), 0, 250, true),
        // 30 toggles per second: 33 + 1/3 ticks apart
        Task::with_phase(toggle_fractional as fn(), 10, 33, 1, 3, true),
    ];

    fn toggle_heartbeat() {
        // Writing 1 to PINx toggles the pin
        unsafe { (*PORTB::ptr()).pinb.write(|w| w.bits(LED_HEARTBEAT)) };
    }

    fn toggle_fractional() {
        unsafe { (*PORTB::ptr()).pinb.write(|w| w.bits(LED_FRACTIONAL)) };
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER1_OVF() {
        critical_section::with(|cs| {
            if let Some(scheduler) = SCHEDULER.borrow_ref_mut(cs).as_mut() {
                scheduler.dispatch();
            }
        });
    }

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();
        dp.PORTB
            .ddrb
            .write(|w| unsafe { w.bits(LED_HEARTBEAT | LED_FRACTIONAL) });

        let mut logger = SerialLogger::new(Uart::new(dp.USART0));
        let _ = logger.log_event("boot", avr_tick_scheduler::VERSION);

        let tasks = unsafe { &mut *core::ptr::addr_of_mut!(TASKS) };
        let mut scheduler = Scheduler::new(dp.TC1);
        match scheduler.init(tasks, cycles_per_tick(CPU_FREQ_HZ, TICK_HZ), true) {
            Ok(()) => {
                let _ = logger.log_timer_config(&scheduler.timer_config());
            }
            Err(e) => {
                let _ = logger.log_error(&e);
            }
        }

        critical_section::with(|cs| SCHEDULER.borrow(cs).replace(Some(scheduler)));

        // Enable interrupts globally
        unsafe { avr_device::interrupt::enable() };

        loop {
            avr_device::asm::sleep();
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    println!(
        "avr_tick_scheduler {}: the firmware image only builds for AVR targets",
        avr_tick_scheduler::VERSION
    );
}
