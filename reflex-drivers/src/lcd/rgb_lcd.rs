//! RGB character LCD driver
//!
//! Drives the character controller and the backlight LED driver over a
//! shared bus. Every operation is a sequence of independent two-byte
//! transactions, so a failure part way through leaves the earlier writes
//! in effect.
//!
//! # Initialization
//!
//! After power-on the controller needs time before it accepts commands,
//! and the function-set instruction is repeated with settling delays:
//!
//! | Step                | Write                         | Then wait |
//! |---------------------|-------------------------------|-----------|
//! | power-on            | -                             | 50 ms     |
//! | function set (x4)   | `0x20 \| lines \| dots`       | 4.5 ms, 150 ms, -, - |
//! | display control     | `0x08 \| on \| cursor \| blink` | -       |
//! | clear               | `0x01`                        | 2 ms      |
//! | entry mode          | `0x04 \| flags`               | -         |
//! | backlight power-on  | MODE1, LEDOUT, MODE2          | -         |
//!
//! The sequence stops at the first failing write.

use core::fmt;

use embedded_hal::delay::DelayNs;
use reflex_core::config::{DisplayConfig, DisplayControl, EntryMode};
use reflex_core::traits::{CharacterDisplay, DriverError, RgbBacklight};
use reflex_core::Rgb;
use reflex_hal::I2cBus;

use super::backlight::{self, BacklightRegister};
use super::command::{self, cmd, LcdWrite, ShiftDirection, ShiftTarget, LCD_ADDRESS};

/// Wait before the first command after power-on
pub const POWER_ON_DELAY_MS: u32 = 50;
/// Execution time of the clear instruction
pub const CLEAR_DELAY_US: u32 = 2_000;
/// Execution time of the return-home instruction
pub const HOME_DELAY_US: u32 = 1_600;

/// Steps of the initialization sequence, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStage {
    FunctionSet1,
    FunctionSet2,
    FunctionSet3,
    FunctionSet4,
    DisplayControl,
    Clear,
    EntryMode,
    BacklightMode1,
    BacklightLedOut,
    BacklightMode2,
}

impl InitStage {
    /// Every stage in execution order
    pub const SEQUENCE: [InitStage; 10] = [
        InitStage::FunctionSet1,
        InitStage::FunctionSet2,
        InitStage::FunctionSet3,
        InitStage::FunctionSet4,
        InitStage::DisplayControl,
        InitStage::Clear,
        InitStage::EntryMode,
        InitStage::BacklightMode1,
        InitStage::BacklightLedOut,
        InitStage::BacklightMode2,
    ];

    /// Wait after the stage completes, in microseconds
    ///
    /// The clear instruction carries its own delay.
    pub const fn settle_us(self) -> u32 {
        match self {
            InitStage::FunctionSet1 => 4_500,
            InitStage::FunctionSet2 => 150_000,
            _ => 0,
        }
    }
}

/// Grove RGB LCD on an I2C bus
pub struct RgbLcd<B, D> {
    bus: B,
    delay: D,
    config: DisplayConfig,
}

impl<B: I2cBus, D: DelayNs> RgbLcd<B, D> {
    /// Create a driver. Nothing is sent until [`init`](Self::init).
    ///
    /// The bus must already be initialized.
    pub fn new(bus: B, delay: D, config: DisplayConfig) -> Self {
        Self { bus, delay, config }
    }

    /// Run the power-on initialization sequence
    ///
    /// Leaves the display on and cleared, the entry mode and cursor flags
    /// from the configuration applied, and the backlight ready for colour
    /// writes.
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        for stage in InitStage::SEQUENCE {
            #[cfg(feature = "defmt")]
            defmt::trace!("LCD init: {}", stage);

            if let Err(e) = self.run_stage(stage) {
                #[cfg(feature = "defmt")]
                defmt::warn!("LCD init failed at {}: {}", stage, e);

                return Err(e);
            }

            let settle = stage.settle_us();
            if settle > 0 {
                self.delay.delay_us(settle);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "LCD ready: {}x{}",
            self.config.columns,
            self.config.rows.count()
        );

        Ok(())
    }

    fn run_stage(&mut self, stage: InitStage) -> Result<(), DriverError> {
        match stage {
            InitStage::FunctionSet1
            | InitStage::FunctionSet2
            | InitStage::FunctionSet3
            | InitStage::FunctionSet4 => {
                self.command(cmd::FUNCTION_SET | self.config.function_bits())
            }
            InitStage::DisplayControl => self.set_display_control(DisplayControl {
                display_on: true,
                ..self.config.control
            }),
            InitStage::Clear => self.clear(),
            InitStage::EntryMode => self.set_entry_mode(self.config.entry),
            InitStage::BacklightMode1 => self.power_on_write(0),
            InitStage::BacklightLedOut => self.power_on_write(1),
            InitStage::BacklightMode2 => self.power_on_write(2),
        }
    }

    fn power_on_write(&mut self, index: usize) -> Result<(), DriverError> {
        let (register, value) = backlight::POWER_ON[index];
        self.set_backlight_register(register, value)
    }

    fn send(&mut self, write: LcdWrite) -> Result<(), DriverError> {
        let [selector, payload] = write.to_bytes();
        self.bus.transmit_two(LCD_ADDRESS, selector, payload)?;
        Ok(())
    }

    fn command(&mut self, instruction: u8) -> Result<(), DriverError> {
        self.send(LcdWrite::Command(instruction))
    }

    /// Clear the display and return the cursor home
    ///
    /// The execution delay runs even when the write fails.
    pub fn clear(&mut self) -> Result<(), DriverError> {
        let result = self.command(cmd::CLEAR_DISPLAY);
        self.delay.delay_us(CLEAR_DELAY_US);
        result
    }

    /// Return the cursor home and undo any display shift
    pub fn home(&mut self) -> Result<(), DriverError> {
        let result = self.command(cmd::RETURN_HOME);
        self.delay.delay_us(HOME_DELAY_US);
        result
    }

    /// Move the cursor
    ///
    /// Rows beyond the configured count and columns beyond the
    /// controller's 40-column line are rejected without bus traffic.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DriverError> {
        let instruction = if row < self.config.rows.count() {
            command::cursor_command(col, row)
        } else {
            None
        };

        match instruction {
            Some(instruction) => self.command(instruction),
            None => Err(DriverError::InvalidPosition { col, row }),
        }
    }

    /// Write one character code at the cursor
    pub fn put_char(&mut self, c: u8) -> Result<(), DriverError> {
        self.send(LcdWrite::CharacterData(c))
    }

    /// Write a string byte by byte, stopping at the first failure
    pub fn put_str(&mut self, s: &str) -> Result<(), DriverError> {
        for c in s.bytes() {
            self.put_char(c)?;
        }
        Ok(())
    }

    /// Write one backlight register
    pub fn set_backlight_register(
        &mut self,
        register: BacklightRegister,
        value: u8,
    ) -> Result<(), DriverError> {
        backlight::write_register(&mut self.bus, register, value)?;
        Ok(())
    }

    /// Set backlight channel intensities (red, then green, then blue)
    pub fn set_backlight_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), DriverError> {
        backlight::write_rgb(&mut self.bus, r, g, b)?;
        Ok(())
    }

    pub fn set_backlight_color(&mut self, color: Rgb) -> Result<(), DriverError> {
        self.set_backlight_rgb(color.r, color.g, color.b)
    }

    /// Apply display-control flags
    ///
    /// The stored flags change only when the write succeeds.
    pub fn set_display_control(&mut self, control: DisplayControl) -> Result<(), DriverError> {
        self.command(cmd::DISPLAY_CONTROL | control.bits())?;
        self.config.control = control;
        Ok(())
    }

    /// Apply entry-mode flags
    ///
    /// The stored flags change only when the write succeeds.
    pub fn set_entry_mode(&mut self, entry: EntryMode) -> Result<(), DriverError> {
        self.command(cmd::ENTRY_MODE_SET | entry.bits())?;
        self.config.entry = entry;
        Ok(())
    }

    /// Move the cursor or the whole display by one position
    pub fn shift(
        &mut self,
        target: ShiftTarget,
        direction: ShiftDirection,
    ) -> Result<(), DriverError> {
        self.command(command::shift_command(target, direction))
    }

    /// Define a custom character
    ///
    /// `pattern` holds one row per byte, top to bottom, using the low five
    /// bits. Slots wrap modulo 8. Character writes go to CGRAM afterwards
    /// until the cursor is moved with [`set_cursor`](Self::set_cursor) or
    /// [`home`](Self::home).
    pub fn create_char(&mut self, slot: u8, pattern: &[u8; 8]) -> Result<(), DriverError> {
        #[cfg(feature = "defmt")]
        defmt::debug!("LCD: custom character {}", slot % command::CUSTOM_CHAR_SLOTS);

        self.command(command::cgram_command(slot))?;
        for &row in pattern {
            self.put_char(row & 0x1F)?;
        }
        Ok(())
    }

    /// Current display configuration, including applied flag changes
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Direct access to the bus, e.g. for other peers
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }
}

impl<B: I2cBus, D: DelayNs> CharacterDisplay for RgbLcd<B, D> {
    fn clear(&mut self) -> Result<(), DriverError> {
        RgbLcd::clear(self)
    }

    fn home(&mut self) -> Result<(), DriverError> {
        RgbLcd::home(self)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DriverError> {
        RgbLcd::set_cursor(self, col, row)
    }

    fn put_char(&mut self, c: u8) -> Result<(), DriverError> {
        RgbLcd::put_char(self, c)
    }
}

impl<B: I2cBus, D: DelayNs> RgbBacklight for RgbLcd<B, D> {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), DriverError> {
        self.set_backlight_rgb(r, g, b)
    }
}

impl<B: I2cBus, D: DelayNs> fmt::Write for RgbLcd<B, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s).map_err(|_| fmt::Error)
    }
}
