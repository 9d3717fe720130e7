//! ATmega328P-specific HAL for the Reflex bus stack
//!
//! This crate provides the ATmega328P implementation of the
//! `reflex-hal` register traits:
//!
//! - [`twi::Twi`] - memory-mapped TWI register block, implements
//!   [`reflex_hal::TwiRegisters`]
//! - [`delay::CycleDelay`] - busy-loop delay, implements
//!   [`embedded_hal::delay::DelayNs`]
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! let twi = reflex_hal_atmega328p::twi::Twi::take().unwrap();
//! let delay = reflex_hal_atmega328p::delay::CycleDelay::<16_000_000>::new();
//! ```

#![no_std]

pub mod delay;
pub mod twi;

// Re-export shared types from reflex-hal
pub use reflex_hal::{ClockDivisor, TwiAction, TwiRegisters};
