//! Reflex Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the bus and display
//! drivers are written against. Chip-specific HALs implement the register
//! capability; the drivers never touch a peripheral register directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (reaction game firmware)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  reflex-drivers (RgbLcd → TwiMaster)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  reflex-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  reflex-hal-  │       │  SimTwi       │
//! │  atmega328p   │       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`twi::TwiRegisters`] - Register-level two-wire peripheral access
//! - [`i2c::I2cBus`] - Transaction-level bus master operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod twi;

// Re-export key types at crate root for convenience
pub use i2c::{Address, BusError, BusStage, Direction, I2cBus, I2cConfig};
pub use twi::{ClockDivisor, Prescaler, TwiAction, TwiRegisters};
