//! TWI register block for the ATmega328P
//!
//! Memory-mapped access to the two-wire peripheral. The bus master in
//! `reflex-drivers` sequences these registers; this module only maps the
//! abstract actions onto control register bits.

use core::cell::Cell;
use core::ptr::{read_volatile, write_volatile};

use critical_section::Mutex;
use reflex_hal::twi::status;
use reflex_hal::{ClockDivisor, TwiAction, TwiRegisters};

/// Data-space register addresses
mod reg {
    /// Bit rate register
    pub const TWBR: *mut u8 = 0xB8 as *mut u8;
    /// Status register (prescaler in bits 0-1)
    pub const TWSR: *mut u8 = 0xB9 as *mut u8;
    /// Data register
    pub const TWDR: *mut u8 = 0xBB as *mut u8;
    /// Control register
    pub const TWCR: *mut u8 = 0xBC as *mut u8;
}

/// TWCR bits
mod twcr {
    /// Interrupt flag, set by hardware when an event completes
    pub const TWINT: u8 = 1 << 7;
    /// Enable acknowledge
    pub const TWEA: u8 = 1 << 6;
    /// Start condition
    pub const TWSTA: u8 = 1 << 5;
    /// Stop condition
    pub const TWSTO: u8 = 1 << 4;
    /// Peripheral enable
    pub const TWEN: u8 = 1 << 2;
}

static TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

/// Control register value for an action
///
/// Writing TWINT clears the flag, which starts the next bus event.
pub const fn control_bits(action: TwiAction) -> u8 {
    use twcr::*;

    match action {
        TwiAction::Disable => 0,
        TwiAction::Start => TWINT | TWSTA | TWEN,
        TwiAction::Stop => TWINT | TWSTO | TWEN,
        TwiAction::Transmit => TWINT | TWEN,
        TwiAction::ReceiveAck => TWINT | TWEA | TWEN,
        TwiAction::ReceiveNack => TWINT | TWEN,
    }
}

/// Owner of the TWI peripheral registers
///
/// Only one instance exists at a time; whoever holds it owns the bus.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Twi {
    _private: (),
}

impl Twi {
    /// Take the peripheral
    ///
    /// Returns `None` if it was already taken.
    pub fn take() -> Option<Self> {
        critical_section::with(|cs| {
            let taken = TAKEN.borrow(cs);
            if taken.get() {
                None
            } else {
                taken.set(true);
                Some(Self { _private: () })
            }
        })
    }

    /// Create an instance without checking ownership
    ///
    /// # Safety
    /// The caller must ensure no other instance drives the registers
    /// concurrently.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    fn read(register: *mut u8) -> u8 {
        // SAFETY: fixed MMIO address of the on-chip TWI, owned by `self`
        unsafe { read_volatile(register) }
    }

    fn write(register: *mut u8, value: u8) {
        // SAFETY: fixed MMIO address of the on-chip TWI, owned by `self`
        unsafe { write_volatile(register, value) }
    }
}

impl TwiRegisters for Twi {
    fn set_clock(&mut self, divisor: ClockDivisor) {
        Self::write(reg::TWBR, divisor.bit_rate);
        // Only the prescaler bits of TWSR are writable
        Self::write(reg::TWSR, divisor.prescaler as u8);
    }

    fn trigger(&mut self, action: TwiAction) {
        Self::write(reg::TWCR, control_bits(action));
    }

    fn event_complete(&mut self) -> bool {
        Self::read(reg::TWCR) & twcr::TWINT != 0
    }

    fn status(&mut self) -> u8 {
        Self::read(reg::TWSR) & status::MASK
    }

    fn write_data(&mut self, byte: u8) {
        Self::write(reg::TWDR, byte);
    }

    fn read_data(&mut self) -> u8 {
        Self::read(reg::TWDR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_bits() {
        assert_eq!(control_bits(TwiAction::Disable), 0x00);
        assert_eq!(control_bits(TwiAction::Start), 0xA4);
        assert_eq!(control_bits(TwiAction::Stop), 0x94);
        assert_eq!(control_bits(TwiAction::Transmit), 0x84);
        assert_eq!(control_bits(TwiAction::ReceiveAck), 0xC4);
        assert_eq!(control_bits(TwiAction::ReceiveNack), 0x84);
    }

    #[test]
    fn test_every_event_clears_the_flag() {
        let actions = [
            TwiAction::Start,
            TwiAction::Stop,
            TwiAction::Transmit,
            TwiAction::ReceiveAck,
            TwiAction::ReceiveNack,
        ];

        for action in actions {
            let bits = control_bits(action);
            assert_ne!(bits & twcr::TWINT, 0);
            assert_ne!(bits & twcr::TWEN, 0);
        }
    }
}
