//! I2C bus abstractions
//!
//! Provides the transaction-level bus master trait the display drivers are
//! written against, together with the address, direction and error types
//! shared by every bus implementation.

use core::fmt;

use crate::twi::status;

/// Transfer direction, carried in the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// 7-bit I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Create an address from a 7-bit value
    ///
    /// Returns `None` if the value does not fit in 7 bits.
    pub const fn new(address: u8) -> Option<Self> {
        if address <= 0x7F {
            Some(Self(address))
        } else {
            None
        }
    }

    /// Create an address for a statically known peer
    ///
    /// # Panics
    /// Panics if the value does not fit in 7 bits. In a `const` context the
    /// panic is a compile error.
    pub const fn fixed(address: u8) -> Self {
        match Self::new(address) {
            Some(address) => address,
            None => panic!("I2C address must fit in 7 bits"),
        }
    }

    /// The raw 7-bit value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Address byte placed on the bus (address shifted left, R/W in bit 0)
    pub const fn with_direction(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction as u8
    }
}

/// Point in a transaction at which a bus error was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusStage {
    /// Start or repeated start condition
    Start,
    /// Address cycle for the given direction
    Address(Direction),
    /// Transmitted data byte
    Data,
    /// Received data byte
    Receive,
}

/// Error from bus master operations
///
/// A peer that is absent, a peer that NACKs and an electrically stuck bus
/// all surface as [`BusError::Status`]; the status code is kept for
/// diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Status register did not hold the code expected for this stage
    Status { stage: BusStage, status: u8 },
    /// Event-complete flag did not rise within the poll budget
    Timeout { stage: BusStage },
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Status { stage, status } => {
                write!(f, "unexpected bus status {:#04x} at {:?}", status, stage)
            }
            BusError::Timeout { stage } => write!(f, "bus timed out at {:?}", stage),
            BusError::InvalidAddress(address) => {
                write!(f, "invalid 7-bit address {:#04x}", address)
            }
        }
    }
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match *self {
            BusError::Status { status, .. } => match status {
                status::MT_SLA_NACK | status::MR_SLA_NACK => {
                    ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
                }
                status::MT_DATA_NACK => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
                status::ARB_LOST => ErrorKind::ArbitrationLoss,
                status::BUS_ERROR => ErrorKind::Bus,
                _ => ErrorKind::Other,
            },
            BusError::Timeout { .. } | BusError::InvalidAddress(_) => ErrorKind::Other,
        }
    }
}

/// I2C bus master
///
/// Transaction-level operations of a single bus master. All operations
/// block until the bus event completes. Exclusive access for the duration
/// of a transaction is expressed through `&mut self`; an implementation must
/// not be driven from two execution contexts at once.
///
/// The raw operations ([`begin_transaction`](Self::begin_transaction),
/// [`write_byte`](Self::write_byte), ...) leave stop emission to the caller
/// so several writes can be chained in one transaction. The `transmit_*`
/// helpers always finish with a stop.
pub trait I2cBus {
    /// Configure the bus clock. Idempotent.
    fn initialize(&mut self);

    /// Issue a start condition and address the peer
    ///
    /// On error the transaction is not started and no further bytes may
    /// be sent.
    fn begin_transaction(&mut self, address: Address, direction: Direction)
        -> Result<(), BusError>;

    /// Issue a stop condition
    fn end_transaction(&mut self);

    /// Send one byte; valid after a successful write-direction start
    fn write_byte(&mut self, byte: u8) -> Result<(), BusError>;

    /// Read one byte and acknowledge it (more bytes will follow)
    fn read_byte_ack(&mut self) -> Result<u8, BusError>;

    /// Read one byte without acknowledgement (last byte of the read)
    fn read_byte_nack(&mut self) -> Result<u8, BusError>;

    /// Send bytes in order, stopping at the first failure
    ///
    /// Bytes after the failing one are never attempted.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Fill `buf`, acknowledging every byte except the last
    ///
    /// An empty buffer performs no bus activity.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        if let Some((last, head)) = buf.split_last_mut() {
            for byte in head {
                *byte = self.read_byte_ack()?;
            }
            *last = self.read_byte_nack()?;
        }
        Ok(())
    }

    /// Send a single byte to a peer in its own transaction
    fn transmit_one(&mut self, address: Address, byte: u8) -> Result<(), BusError> {
        self.transmit_many(address, &[byte])
    }

    /// Send a pair of bytes to a peer (command or register writes)
    fn transmit_two(&mut self, address: Address, first: u8, second: u8) -> Result<(), BusError> {
        self.transmit_many(address, &[first, second])
    }

    /// Send a buffer to a peer in its own transaction
    ///
    /// The stop condition is issued even when the start or a write fails,
    /// so the bus is always left idle.
    fn transmit_many(&mut self, address: Address, bytes: &[u8]) -> Result<(), BusError> {
        let result = self
            .begin_transaction(address, Direction::Write)
            .and_then(|()| self.write_bytes(bytes));
        self.end_transaction();
        result
    }
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn initialize(&mut self) {
        (**self).initialize()
    }

    fn begin_transaction(
        &mut self,
        address: Address,
        direction: Direction,
    ) -> Result<(), BusError> {
        (**self).begin_transaction(address, direction)
    }

    fn end_transaction(&mut self) {
        (**self).end_transaction()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        (**self).write_byte(byte)
    }

    fn read_byte_ack(&mut self) -> Result<u8, BusError> {
        (**self).read_byte_ack()
    }

    fn read_byte_nack(&mut self) -> Result<u8, BusError> {
        (**self).read_byte_nack()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        (**self).write_bytes(bytes)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read_bytes(buf)
    }

    fn transmit_one(&mut self, address: Address, byte: u8) -> Result<(), BusError> {
        (**self).transmit_one(address, byte)
    }

    fn transmit_two(&mut self, address: Address, first: u8, second: u8) -> Result<(), BusError> {
        (**self).transmit_two(address, first, second)
    }

    fn transmit_many(&mut self, address: Address, bytes: &[u8]) -> Result<(), BusError> {
        (**self).transmit_many(address, bytes)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error, ErrorKind, NoAcknowledgeSource};

    #[test]
    fn test_address_range() {
        assert_eq!(Address::new(0x3E).map(Address::get), Some(0x3E));
        assert_eq!(Address::new(0x7F).map(Address::get), Some(0x7F));
        assert!(Address::new(0x80).is_none());
    }

    #[test]
    fn test_address_byte() {
        const LCD: Address = Address::fixed(0x3E);
        assert_eq!(LCD.with_direction(Direction::Write), 0x7C);
        assert_eq!(LCD.with_direction(Direction::Read), 0x7D);

        let rgb = Address::fixed(0x62);
        assert_eq!(rgb.with_direction(Direction::Write), 0xC4);
    }

    #[test]
    #[should_panic]
    fn test_fixed_rejects_wide_address() {
        let _ = Address::fixed(0xC4);
    }

    #[test]
    fn test_error_kinds() {
        let address_nack = BusError::Status {
            stage: BusStage::Address(Direction::Write),
            status: status::MT_SLA_NACK,
        };
        assert_eq!(
            address_nack.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );

        let data_nack = BusError::Status {
            stage: BusStage::Data,
            status: status::MT_DATA_NACK,
        };
        assert_eq!(
            data_nack.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );

        let lost = BusError::Status {
            stage: BusStage::Data,
            status: status::ARB_LOST,
        };
        assert_eq!(lost.kind(), ErrorKind::ArbitrationLoss);

        let timeout = BusError::Timeout {
            stage: BusStage::Start,
        };
        assert_eq!(timeout.kind(), ErrorKind::Other);
    }

    /// Counts calls; batched transfers bypass the byte-level methods
    #[derive(Default)]
    struct BatchBus {
        byte_calls: usize,
        batches: usize,
        reads: usize,
    }

    impl I2cBus for BatchBus {
        fn initialize(&mut self) {}

        fn begin_transaction(&mut self, _: Address, _: Direction) -> Result<(), BusError> {
            self.byte_calls += 1;
            Ok(())
        }

        fn end_transaction(&mut self) {
            self.byte_calls += 1;
        }

        fn write_byte(&mut self, _: u8) -> Result<(), BusError> {
            self.byte_calls += 1;
            Ok(())
        }

        fn read_byte_ack(&mut self) -> Result<u8, BusError> {
            self.byte_calls += 1;
            Ok(0)
        }

        fn read_byte_nack(&mut self) -> Result<u8, BusError> {
            self.byte_calls += 1;
            Ok(0)
        }

        fn write_bytes(&mut self, _: &[u8]) -> Result<(), BusError> {
            self.batches += 1;
            Ok(())
        }

        fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
            self.reads += 1;
            buf.fill(0xAA);
            Ok(())
        }

        fn transmit_many(&mut self, _: Address, _: &[u8]) -> Result<(), BusError> {
            self.batches += 1;
            Ok(())
        }
    }

    fn through_ref<B: I2cBus>(mut bus: B) {
        const LCD: Address = Address::fixed(0x3E);
        bus.transmit_one(LCD, 0x01).unwrap();
        bus.transmit_two(LCD, 0x80, 0x01).unwrap();
        bus.transmit_many(LCD, &[1, 2, 3]).unwrap();
        bus.write_bytes(&[4, 5]).unwrap();

        let mut buf = [0u8; 2];
        bus.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xAA]);
    }

    #[test]
    fn test_mut_ref_keeps_overrides() {
        let mut bus = BatchBus::default();
        through_ref(&mut bus);

        assert_eq!(bus.batches, 4);
        assert_eq!(bus.reads, 1);
        assert_eq!(bus.byte_calls, 0);
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(I2cConfig::default(), I2cConfig::STANDARD);
        assert_eq!(I2cConfig::FAST.frequency, 400_000);
    }
}
