//! Board-agnostic core types for the reaction game display
//!
//! This crate contains everything the display stack shares with the
//! application that does not depend on a specific bus implementation:
//!
//! - Display configuration (rows, dot size, entry mode, display control)
//! - Backlight colour type and presets
//! - Display and backlight traits with their error type

#![no_std]
#![deny(unsafe_code)]

pub mod color;
pub mod config;
pub mod traits;

pub use color::Rgb;
pub use config::DisplayConfig;
pub use traits::{CharacterDisplay, DisplayExt, DriverError, RgbBacklight};
