//! Grove RGB character LCD
//!
//! The module carries two peers on one bus:
//!
//! - the character controller (HD44780 command set) at [`LCD_ADDRESS`]
//! - the PCA9633-style backlight LED driver at [`BACKLIGHT_ADDRESS`]
//!
//! Every controller write is a two-byte transaction: a mode selector
//! followed by the command or character code.

pub mod backlight;
pub mod command;
pub mod rgb_lcd;

pub use backlight::{BacklightRegister, BACKLIGHT_ADDRESS};
pub use command::{LcdWrite, ShiftDirection, ShiftTarget, LCD_ADDRESS};
pub use rgb_lcd::{InitStage, RgbLcd};
