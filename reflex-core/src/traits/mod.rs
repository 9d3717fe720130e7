//! Hardware abstraction traits
//!
//! These traits define the interface between the game logic and the
//! display stack.

pub mod display;

pub use display::{CharacterDisplay, DisplayExt, DriverError, RgbBacklight};
