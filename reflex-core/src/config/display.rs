//! Character display configuration
//!
//! These types describe the logical display state: the geometry chosen at
//! initialization plus the entry-mode and display-control flag sets. The
//! controller chip holds the authoritative copy; the driver never reads it
//! back.

/// Number of display lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rows {
    One,
    Two,
}

impl Rows {
    /// Number of rows as a count
    pub const fn count(self) -> u8 {
        match self {
            Rows::One => 1,
            Rows::Two => 2,
        }
    }
}

/// Character cell size
///
/// 5x10 dots is only available in single-line mode; two-line controllers
/// ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DotSize {
    FiveByEight,
    FiveByTen,
}

/// Cursor movement after each character write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextDirection {
    /// Cursor moves right (address increments)
    LeftToRight,
    /// Cursor moves left (address decrements)
    RightToLeft,
}

/// Entry-mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryMode {
    /// Cursor direction after a write
    pub direction: TextDirection,
    /// Shift the whole display on each write instead of moving the cursor
    pub autoscroll: bool,
}

impl EntryMode {
    /// Left-to-right text, no display shift
    pub const LEFT_TO_RIGHT: Self = Self {
        direction: TextDirection::LeftToRight,
        autoscroll: false,
    };

    /// Flag bits of the entry-mode command
    pub const fn bits(self) -> u8 {
        let direction = match self.direction {
            TextDirection::LeftToRight => 0x02,
            TextDirection::RightToLeft => 0x00,
        };
        direction | if self.autoscroll { 0x01 } else { 0x00 }
    }
}

impl Default for EntryMode {
    fn default() -> Self {
        Self::LEFT_TO_RIGHT
    }
}

/// Display on/off control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayControl {
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
}

impl DisplayControl {
    /// Display on, cursor hidden
    pub const TEXT_ONLY: Self = Self {
        display_on: true,
        cursor_on: false,
        blink_on: false,
    };

    /// Display on with a blinking cursor
    pub const BLINKING_CURSOR: Self = Self {
        display_on: true,
        cursor_on: true,
        blink_on: true,
    };

    /// Flag bits of the display-control command
    pub const fn bits(self) -> u8 {
        (if self.display_on { 0x04 } else { 0x00 })
            | (if self.cursor_on { 0x02 } else { 0x00 })
            | (if self.blink_on { 0x01 } else { 0x00 })
    }
}

impl Default for DisplayControl {
    fn default() -> Self {
        Self::TEXT_ONLY
    }
}

/// Complete display configuration, fixed before initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Visible characters per row
    pub columns: u8,
    /// Number of rows
    pub rows: Rows,
    /// Character cell size
    pub dots: DotSize,
    /// Initial display-control flags (the display is always switched on)
    pub control: DisplayControl,
    /// Initial entry-mode flags
    pub entry: EntryMode,
}

impl DisplayConfig {
    /// Grove 16x2 RGB LCD as used by the reaction game
    pub const GROVE_16X2: Self = Self {
        columns: 16,
        rows: Rows::Two,
        dots: DotSize::FiveByEight,
        control: DisplayControl::BLINKING_CURSOR,
        entry: EntryMode {
            direction: TextDirection::LeftToRight,
            autoscroll: false,
        },
    };

    /// Flag bits of the function-set command
    pub const fn function_bits(&self) -> u8 {
        let lines = match self.rows {
            Rows::One => 0x00,
            Rows::Two => 0x08,
        };
        let dots = match self.dots {
            DotSize::FiveByEight => 0x00,
            DotSize::FiveByTen => 0x04,
        };
        lines | dots
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::GROVE_16X2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_mode_bits() {
        assert_eq!(EntryMode::LEFT_TO_RIGHT.bits(), 0x02);

        let right_scroll = EntryMode {
            direction: TextDirection::RightToLeft,
            autoscroll: true,
        };
        assert_eq!(right_scroll.bits(), 0x01);
    }

    #[test]
    fn test_display_control_bits() {
        assert_eq!(DisplayControl::TEXT_ONLY.bits(), 0x04);
        assert_eq!(DisplayControl::BLINKING_CURSOR.bits(), 0x07);

        let off = DisplayControl {
            display_on: false,
            cursor_on: false,
            blink_on: false,
        };
        assert_eq!(off.bits(), 0x00);
    }

    #[test]
    fn test_function_bits() {
        let config = DisplayConfig::GROVE_16X2;
        assert_eq!(config.function_bits(), 0x08);

        let single = DisplayConfig {
            rows: Rows::One,
            dots: DotSize::FiveByTen,
            ..config
        };
        assert_eq!(single.function_bits(), 0x04);
    }

    #[test]
    fn test_rows_count() {
        assert_eq!(Rows::One.count(), 1);
        assert_eq!(Rows::Two.count(), 2);
        assert_eq!(DisplayConfig::default().rows.count(), 2);
    }
}
