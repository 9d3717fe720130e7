//! RGB backlight LED driver
//!
//! The backlight is a four-channel PWM LED driver. Each channel has its own
//! duty-cycle register; writes are single register/value transactions.

use reflex_hal::{Address, BusError, I2cBus};

/// Backlight LED driver address
pub const BACKLIGHT_ADDRESS: Address = Address::fixed(0x62);

/// Backlight driver registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BacklightRegister {
    Mode1 = 0x00,
    Mode2 = 0x01,
    /// Blue channel duty cycle
    Blue = 0x02,
    /// Green channel duty cycle
    Green = 0x03,
    /// Red channel duty cycle
    Red = 0x04,
    /// LED output state
    LedOut = 0x08,
}

/// MODE1: normal operation, oscillator on
pub const MODE1_NORMAL: u8 = 0x00;
/// LEDOUT: every channel driven by its PWM register
pub const LEDOUT_ALL_PWM: u8 = 0xFF;
/// MODE2: group control set to blinking
pub const MODE2_DMBLNK: u8 = 0x20;

/// Register writes that bring the backlight out of reset
pub const POWER_ON: [(BacklightRegister, u8); 3] = [
    (BacklightRegister::Mode1, MODE1_NORMAL),
    (BacklightRegister::LedOut, LEDOUT_ALL_PWM),
    (BacklightRegister::Mode2, MODE2_DMBLNK),
];

/// Write one backlight register
pub fn write_register<B: I2cBus>(
    bus: &mut B,
    register: BacklightRegister,
    value: u8,
) -> Result<(), BusError> {
    bus.transmit_two(BACKLIGHT_ADDRESS, register as u8, value)
}

/// Write the three colour channels in the order red, green, blue
///
/// Stops at the first failing channel; the remaining channels keep their
/// previous value.
pub fn write_rgb<B: I2cBus>(bus: &mut B, r: u8, g: u8, b: u8) -> Result<(), BusError> {
    write_register(bus, BacklightRegister::Red, r)?;
    write_register(bus, BacklightRegister::Green, g)?;
    write_register(bus, BacklightRegister::Blue, b)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use super::*;
    use reflex_hal::{BusStage, Direction};

    /// Transaction-level bus that records whole transmissions
    #[derive(Default)]
    struct MockBus {
        sent: Vec<(u8, Vec<u8>)>,
        fail_at: Option<usize>,
    }

    impl I2cBus for MockBus {
        fn initialize(&mut self) {}

        fn begin_transaction(&mut self, _: Address, _: Direction) -> Result<(), BusError> {
            Ok(())
        }

        fn end_transaction(&mut self) {}

        fn write_byte(&mut self, _: u8) -> Result<(), BusError> {
            Ok(())
        }

        fn read_byte_ack(&mut self) -> Result<u8, BusError> {
            Ok(0)
        }

        fn read_byte_nack(&mut self) -> Result<u8, BusError> {
            Ok(0)
        }

        fn transmit_many(&mut self, address: Address, bytes: &[u8]) -> Result<(), BusError> {
            if self.fail_at == Some(self.sent.len()) {
                return Err(BusError::Timeout {
                    stage: BusStage::Start,
                });
            }
            self.sent.push((address.get(), bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_register_values() {
        assert_eq!(BacklightRegister::Mode1 as u8, 0x00);
        assert_eq!(BacklightRegister::Mode2 as u8, 0x01);
        assert_eq!(BacklightRegister::Blue as u8, 0x02);
        assert_eq!(BacklightRegister::Green as u8, 0x03);
        assert_eq!(BacklightRegister::Red as u8, 0x04);
        assert_eq!(BacklightRegister::LedOut as u8, 0x08);
    }

    #[test]
    fn test_write_register() {
        let mut bus = MockBus::default();
        write_register(&mut bus, BacklightRegister::LedOut, 0xFF).unwrap();
        assert_eq!(bus.sent, [(0x62u8, vec![0x08u8, 0xFF])]);
    }

    #[test]
    fn test_write_rgb_order() {
        let mut bus = MockBus::default();
        write_rgb(&mut bus, 10, 20, 30).unwrap();
        assert_eq!(
            bus.sent,
            [
                (0x62u8, vec![0x04u8, 10]),
                (0x62u8, vec![0x03u8, 20]),
                (0x62u8, vec![0x02u8, 30]),
            ]
        );
    }

    #[test]
    fn test_write_rgb_stops_at_failure() {
        let mut bus = MockBus {
            fail_at: Some(1),
            ..MockBus::default()
        };
        assert!(write_rgb(&mut bus, 1, 2, 3).is_err());
        // Only red reached the driver
        assert_eq!(bus.sent, [(0x62u8, vec![0x04u8, 1])]);
    }
}
