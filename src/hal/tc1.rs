//! ATmega328P Timer/Counter1 in fast PWM mode 14 (TOP = ICR1).
//!
//! TOV1 is raised when the counter reaches ICR1, so one overflow interrupt
//! (TIMER1_OVF) marks one tick. OC1A/OC1B stay disconnected.

use super::timer::{Divider, TimerPeripheral};
use avr_device::atmega328p::TC1;

const WGM11: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;
const WGM13: u8 = 1 << 4;
const TOIE1: u8 = 1 << 0;
// TOV1 | OCF1A | OCF1B | ICF1
const TIFR1_FLAGS: u8 = 0b0010_0111;

impl TimerPeripheral for TC1 {
    fn set_divider(&mut self, divider: Divider) {
        match divider {
            Divider::Stop => self.tccr1b.write(|w| unsafe { w.bits(0) }),
            _ => {
                self.tccr1a.write(|w| unsafe { w.bits(WGM11) });
                self.tccr1b
                    .write(|w| unsafe { w.bits(WGM13 | WGM12 | divider.bits()) });
            }
        }
    }

    fn set_top(&mut self, top: u16) {
        self.icr1.write(|w| unsafe { w.bits(top) });
    }

    fn reset_counter(&mut self) {
        self.tcnt1.write(|w| unsafe { w.bits(0) });
    }

    fn clear_overflow(&mut self) {
        // Flags clear by writing one
        self.tifr1.write(|w| unsafe { w.bits(TIFR1_FLAGS) });
    }

    fn enable_overflow_interrupt(&mut self) {
        self.timsk1.modify(|r, w| unsafe { w.bits(r.bits() | TOIE1) });
    }

    fn disable_overflow_interrupt(&mut self) {
        self.timsk1.modify(|r, w| unsafe { w.bits(r.bits() & !TOIE1) });
    }
}
