//! Character controller command encoding

use reflex_hal::Address;

/// Character controller address
pub const LCD_ADDRESS: Address = Address::fixed(0x3E);

/// Controller instruction codes
pub mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const CURSOR_SHIFT: u8 = 0x10;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// Cursor-shift flags
mod shift {
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const MOVE_RIGHT: u8 = 0x04;
}

/// Selector byte preceding an instruction
const SELECT_COMMAND: u8 = 0x80;
/// Selector byte preceding character data
const SELECT_DATA: u8 = 0x40;

/// Set-DDRAM-address command for the start of each row
pub const ROW_BASE: [u8; 2] = [cmd::SET_DDRAM_ADDR, cmd::SET_DDRAM_ADDR | 0x40];

/// Columns addressable per row, including the off-screen part
pub const MAX_COLUMNS: u8 = 40;

/// Number of user-definable characters
pub const CUSTOM_CHAR_SLOTS: u8 = 8;

/// One controller write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LcdWrite {
    /// Instruction byte
    Command(u8),
    /// Character code written at the cursor (or into CGRAM)
    CharacterData(u8),
}

impl LcdWrite {
    /// Selector and payload as sent on the bus
    pub const fn to_bytes(self) -> [u8; 2] {
        match self {
            LcdWrite::Command(byte) => [SELECT_COMMAND, byte],
            LcdWrite::CharacterData(byte) => [SELECT_DATA, byte],
        }
    }
}

/// What a shift instruction moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftTarget {
    Cursor,
    /// Whole display contents; the cursor follows
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftDirection {
    Left,
    Right,
}

/// Cursor-shift instruction
pub const fn shift_command(target: ShiftTarget, direction: ShiftDirection) -> u8 {
    let target = match target {
        ShiftTarget::Cursor => 0,
        ShiftTarget::Display => shift::DISPLAY_MOVE,
    };
    let direction = match direction {
        ShiftDirection::Left => 0,
        ShiftDirection::Right => shift::MOVE_RIGHT,
    };
    cmd::CURSOR_SHIFT | target | direction
}

/// Set-DDRAM-address instruction for a cursor position
///
/// Returns `None` outside the controller's two 40-column rows.
pub const fn cursor_command(col: u8, row: u8) -> Option<u8> {
    if row as usize >= ROW_BASE.len() || col >= MAX_COLUMNS {
        return None;
    }
    Some(col | ROW_BASE[row as usize])
}

/// Set-CGRAM-address instruction for the first row of a custom character
pub const fn cgram_command(slot: u8) -> u8 {
    cmd::SET_CGRAM_ADDR | ((slot & (CUSTOM_CHAR_SLOTS - 1)) << 3)
}
