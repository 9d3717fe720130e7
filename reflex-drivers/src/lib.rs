//! Bus and display driver implementations
//!
//! This crate provides the two layers of the reaction game's display
//! stack, plus the pieces needed to run them:
//!
//! - Bus master (TWI register sequencing, [`bus::TwiMaster`])
//! - RGB character LCD (command protocol and backlight, [`lcd::RgbLcd`])
//! - Interrupt-safe ownership cell ([`shared::Shared`])
//! - Simulated TWI peripheral for host testing ([`sim::SimTwi`])

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod lcd;
pub mod shared;
pub mod sim;
