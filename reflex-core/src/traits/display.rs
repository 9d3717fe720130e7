//! Character display and backlight traits

use core::fmt;

use reflex_hal::BusError;

use crate::color::Rgb;

/// Errors from display and backlight operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// A bus transaction failed; the display operation was abandoned
    Bus(BusError),
    /// Cursor position outside the controller's address range
    InvalidPosition { col: u8, row: u8 },
}

impl From<BusError> for DriverError {
    fn from(e: BusError) -> Self {
        DriverError::Bus(e)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Bus(e) => write!(f, "display bus error: {}", e),
            DriverError::InvalidPosition { col, row } => {
                write!(f, "cursor position ({}, {}) out of range", col, row)
            }
        }
    }
}

/// Trait for character displays
///
/// Every operation is a sequence of bus transactions. A failure aborts
/// the operation; anything already sent stays on the display.
pub trait CharacterDisplay {
    /// Clear the display and return the cursor home
    fn clear(&mut self) -> Result<(), DriverError>;

    /// Return the cursor (and any display shift) home
    fn home(&mut self) -> Result<(), DriverError>;

    /// Move the cursor
    ///
    /// - `col`: Column number (0-based)
    /// - `row`: Row number (0 or 1)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DriverError>;

    /// Write one character code at the cursor
    fn put_char(&mut self, c: u8) -> Result<(), DriverError>;

    /// Write a string, stopping at the first failing character
    fn put_str(&mut self, s: &str) -> Result<(), DriverError> {
        for c in s.bytes() {
            self.put_char(c)?;
        }
        Ok(())
    }
}

/// Trait for an RGB backlight
///
/// Channels are written independently. After a failed call the backlight
/// colour is undefined.
pub trait RgbBacklight {
    /// Set channel intensities in the order red, green, blue
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), DriverError>;

    /// Set the backlight colour
    fn set_color(&mut self, color: Rgb) -> Result<(), DriverError> {
        self.set_rgb(color.r, color.g, color.b)
    }
}

/// Helper trait for common text layouts
pub trait DisplayExt: CharacterDisplay {
    /// Write text starting at a position
    fn write_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), DriverError> {
        self.set_cursor(col, row)?;
        self.put_str(text)
    }

    /// Overwrite a row with text, padding with spaces up to `width`
    fn write_row(&mut self, row: u8, text: &str, width: u8) -> Result<(), DriverError> {
        self.set_cursor(0, row)?;
        let mut written = 0u8;
        for c in text.bytes().take(width as usize) {
            self.put_char(c)?;
            written += 1;
        }
        for _ in written..width {
            self.put_char(b' ')?;
        }
        Ok(())
    }
}

// Blanket implementation for all CharacterDisplay types
impl<T: CharacterDisplay> DisplayExt for T {}
