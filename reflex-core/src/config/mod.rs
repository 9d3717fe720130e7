//! Configuration types
//!
//! Compile-time configuration of the bus and display stack. Everything
//! here is `const`-constructible and fixed before the drivers are
//! initialized.

pub mod bus;
pub mod display;

pub use bus::*;
pub use display::*;
