//! Bus master implementations
//!
//! Concrete [`reflex_hal::I2cBus`] implementations. The register level is
//! abstracted by [`reflex_hal::TwiRegisters`], so the same master runs on
//! the ATmega328P register block and on [`crate::sim::SimTwi`].

pub mod twi_master;

pub use twi_master::TwiMaster;
