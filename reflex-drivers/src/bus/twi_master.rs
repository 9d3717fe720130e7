//! Polled TWI bus master
//!
//! Drives a [`TwiRegisters`] block through start, address, data and stop
//! events. Every event is followed by a poll of the event-complete flag and
//! a check of the status register against the code expected for that step.
//!
//! # Event sequence of a write
//!
//! ```text
//! START ──► SLA+W ──► data ... data ──► STOP
//!  0x08      0x18       0x28     0x28
//! ```
//!
//! A read uses SLA+R (0x40) and acknowledges every received byte except
//! the last one.

use embedded_hal::i2c::{ErrorType, I2c, Operation};
use reflex_core::config::TwiConfig;
use reflex_hal::twi::status;
use reflex_hal::{Address, BusError, BusStage, Direction, I2cBus, TwiAction, TwiRegisters};

/// Blocking bus master over a TWI register block
pub struct TwiMaster<R> {
    regs: R,
    config: TwiConfig,
}

impl<R: TwiRegisters> TwiMaster<R> {
    /// Create a master. The bus clock is programmed by
    /// [`I2cBus::initialize`].
    pub fn new(regs: R, config: TwiConfig) -> Self {
        Self { regs, config }
    }

    /// Current configuration
    pub fn config(&self) -> &TwiConfig {
        &self.config
    }

    /// The register block, for inspection
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give back the register block
    pub fn release(self) -> R {
        self.regs
    }

    /// Poll the event-complete flag
    fn wait(&mut self, stage: BusStage) -> Result<(), BusError> {
        match self.config.poll_limit {
            Some(limit) => {
                for _ in 0..limit {
                    if self.regs.event_complete() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }

                #[cfg(feature = "defmt")]
                defmt::warn!("TWI: no event completion at {} after {} polls", stage, limit);

                Err(BusError::Timeout { stage })
            }
            None => {
                while !self.regs.event_complete() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
        }
    }

    /// Compare the status register with the codes accepted at `stage`
    fn check(&mut self, stage: BusStage, accepted: &[u8]) -> Result<(), BusError> {
        let status = self.regs.status();
        if accepted.contains(&status) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::trace!("TWI: status {=u8:#x} at {}", status, stage);

            Err(BusError::Status { stage, status })
        }
    }

    /// Trigger an event and wait for it to complete
    fn event(&mut self, action: TwiAction, stage: BusStage) -> Result<(), BusError> {
        self.regs.trigger(action);
        self.wait(stage)
    }

    /// Read a run of bytes, leaving the last one unacknowledged if the
    /// run ends the read
    fn read_run(&mut self, buf: &mut [u8], ends_read: bool) -> Result<(), BusError> {
        if ends_read {
            return self.read_bytes(buf);
        }
        for byte in buf {
            *byte = self.read_byte_ack()?;
        }
        Ok(())
    }

    fn run_operations(
        &mut self,
        address: Address,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusError> {
        let mut current = None;

        for index in 0..operations.len() {
            let direction = match &operations[index] {
                Operation::Read(buf) if buf.is_empty() => continue,
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            // Adjacent operations of the same kind share one address cycle
            if current != Some(direction) {
                self.begin_transaction(address, direction)?;
                current = Some(direction);
            }

            // The last byte of a read run is the one with no bytes after it
            let ends_read = !operations[index + 1..]
                .iter()
                .take_while(|op| matches!(op, Operation::Read(_)))
                .any(|op| matches!(op, Operation::Read(buf) if !buf.is_empty()));
            match &mut operations[index] {
                Operation::Write(bytes) => self.write_bytes(bytes)?,
                Operation::Read(buf) => self.read_run(buf, ends_read)?,
            }
        }
        Ok(())
    }
}

/// Whether an operation puts anything on the bus
fn touches_bus(operation: &Operation<'_>) -> bool {
    !matches!(operation, Operation::Read(buf) if buf.is_empty())
}

impl<R: TwiRegisters> I2cBus for TwiMaster<R> {
    fn initialize(&mut self) {
        self.regs.set_clock(self.config.divisor);
        self.regs.trigger(TwiAction::Disable);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "TWI: bus clock {} Hz (TWBR={}, prescaler {})",
            self.config.bus_hz(),
            self.config.divisor.bit_rate,
            self.config.divisor.prescaler.factor()
        );
    }

    fn begin_transaction(
        &mut self,
        address: Address,
        direction: Direction,
    ) -> Result<(), BusError> {
        self.event(TwiAction::Start, BusStage::Start)?;
        self.check(BusStage::Start, &[status::START, status::REP_START])?;

        let stage = BusStage::Address(direction);
        self.regs.write_data(address.with_direction(direction));
        self.event(TwiAction::Transmit, stage)?;

        let ack = match direction {
            Direction::Write => status::MT_SLA_ACK,
            Direction::Read => status::MR_SLA_ACK,
        };
        self.check(stage, &[ack])
    }

    fn end_transaction(&mut self) {
        self.regs.trigger(TwiAction::Stop);
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.regs.write_data(byte);
        self.event(TwiAction::Transmit, BusStage::Data)?;
        self.check(BusStage::Data, &[status::MT_DATA_ACK])
    }

    fn read_byte_ack(&mut self) -> Result<u8, BusError> {
        self.event(TwiAction::ReceiveAck, BusStage::Receive)?;
        Ok(self.regs.read_data())
    }

    fn read_byte_nack(&mut self) -> Result<u8, BusError> {
        self.event(TwiAction::ReceiveNack, BusStage::Receive)?;
        Ok(self.regs.read_data())
    }
}

impl<R: TwiRegisters> ErrorType for TwiMaster<R> {
    type Error = BusError;
}

impl<R: TwiRegisters> I2c for TwiMaster<R> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let address = Address::new(address).ok_or(BusError::InvalidAddress(address))?;
        if !operations.iter().any(touches_bus) {
            return Ok(());
        }

        let result = self.run_operations(address, operations);
        self.end_transaction();
        result
    }
}
