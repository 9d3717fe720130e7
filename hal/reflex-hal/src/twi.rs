//! Two-wire interface (TWI) register abstractions
//!
//! The TWI peripheral is a byte-level state machine: software writes a
//! control action, the hardware performs one bus event and raises an
//! "event complete" flag, and the status register then describes what
//! happened on the bus. [`TwiRegisters`] is the capability a bus master
//! needs to drive that state machine.

/// TWI status codes (status register with the prescaler bits masked off)
///
/// Names follow the master transmitter (MT) / master receiver (MR) tables
/// of the AVR TWI documentation.
pub mod status {
    /// Mask applied to the raw status register
    pub const MASK: u8 = 0xF8;
    /// Bus error due to an illegal start or stop condition
    pub const BUS_ERROR: u8 = 0x00;
    /// Start condition transmitted
    pub const START: u8 = 0x08;
    /// Repeated start condition transmitted
    pub const REP_START: u8 = 0x10;
    /// SLA+W transmitted, ACK received
    pub const MT_SLA_ACK: u8 = 0x18;
    /// SLA+W transmitted, NACK received
    pub const MT_SLA_NACK: u8 = 0x20;
    /// Data byte transmitted, ACK received
    pub const MT_DATA_ACK: u8 = 0x28;
    /// Data byte transmitted, NACK received
    pub const MT_DATA_NACK: u8 = 0x30;
    /// Arbitration lost in SLA or data
    pub const ARB_LOST: u8 = 0x38;
    /// SLA+R transmitted, ACK received
    pub const MR_SLA_ACK: u8 = 0x40;
    /// SLA+R transmitted, NACK received
    pub const MR_SLA_NACK: u8 = 0x48;
    /// Data byte received, ACK returned
    pub const MR_DATA_ACK: u8 = 0x50;
    /// Data byte received, NACK returned
    pub const MR_DATA_NACK: u8 = 0x58;
    /// No relevant state information available
    pub const NO_INFO: u8 = 0xF8;
}

/// Control actions a bus master can request from the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiAction {
    /// Clear the control register (peripheral disabled, bus released)
    Disable,
    /// Generate a start (or repeated start) condition
    Start,
    /// Generate a stop condition
    Stop,
    /// Shift out the byte held in the data register
    Transmit,
    /// Receive a byte and acknowledge it
    ReceiveAck,
    /// Receive a byte without acknowledging it (last byte of a read)
    ReceiveNack,
}

/// Bit-rate prescaler (TWPS bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Prescaler {
    Div1 = 0,
    Div4 = 1,
    Div16 = 2,
    Div64 = 3,
}

impl Prescaler {
    /// All prescaler settings, smallest first
    pub const ALL: [Prescaler; 4] = [
        Prescaler::Div1,
        Prescaler::Div4,
        Prescaler::Div16,
        Prescaler::Div64,
    ];

    /// Division factor applied to the bit-rate register
    pub const fn factor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }
}

/// Bus clock divisor: bit-rate register value plus prescaler
///
/// SCL frequency = CPU frequency / (16 + 2 * bit_rate * prescaler)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivisor {
    /// Bit-rate register value
    pub bit_rate: u8,
    /// Prescaler setting
    pub prescaler: Prescaler,
}

impl ClockDivisor {
    /// Derive the divisor for a target bus frequency
    ///
    /// The bit-rate value is rounded up so the resulting bus clock never
    /// exceeds `scl_hz`. The smallest prescaler whose value fits in the
    /// 8-bit register is chosen; the value saturates at `Div64`.
    pub const fn from_frequencies(cpu_hz: u32, scl_hz: u32) -> Self {
        let ratio = if scl_hz == 0 { u32::MAX } else { cpu_hz / scl_hz };
        let base = ratio.saturating_sub(16) / 2 + 1;

        let mut i = 0;
        while i < Prescaler::ALL.len() {
            let prescaler = Prescaler::ALL[i];
            let factor = prescaler.factor();
            let value = (base + factor - 1) / factor;
            if value <= u8::MAX as u32 {
                return Self {
                    bit_rate: value as u8,
                    prescaler,
                };
            }
            i += 1;
        }

        Self {
            bit_rate: u8::MAX,
            prescaler: Prescaler::Div64,
        }
    }

    /// Resulting SCL frequency in Hz for the given CPU clock
    pub const fn scl_hz(&self, cpu_hz: u32) -> u32 {
        cpu_hz / (16 + 2 * self.bit_rate as u32 * self.prescaler.factor())
    }
}

/// Register-level access to a two-wire peripheral
///
/// This is the opaque "bus handle" a bus master owns. Implementations map
/// each method onto the peripheral's control, status and data registers;
/// a simulated implementation stands in on the host.
///
/// None of the methods wait. After [`trigger`](Self::trigger) the caller
/// polls [`event_complete`](Self::event_complete) before sampling
/// [`status`](Self::status) or [`read_data`](Self::read_data).
pub trait TwiRegisters {
    /// Program the bus clock divisor
    fn set_clock(&mut self, divisor: ClockDivisor);

    /// Write a control action, starting the corresponding bus event
    fn trigger(&mut self, action: TwiAction);

    /// Check whether the last triggered event has completed
    fn event_complete(&mut self) -> bool;

    /// Current status code, masked with [`status::MASK`]
    fn status(&mut self) -> u8;

    /// Load the data register (address or payload byte)
    fn write_data(&mut self, byte: u8);

    /// Read the data register (last received byte)
    fn read_data(&mut self) -> u8;
}

impl<T: TwiRegisters + ?Sized> TwiRegisters for &mut T {
    fn set_clock(&mut self, divisor: ClockDivisor) {
        (**self).set_clock(divisor)
    }

    fn trigger(&mut self, action: TwiAction) {
        (**self).trigger(action)
    }

    fn event_complete(&mut self) -> bool {
        (**self).event_complete()
    }

    fn status(&mut self) -> u8 {
        (**self).status()
    }

    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }
}
