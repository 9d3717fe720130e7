//! Backlight colours

/// RGB triple of 8-bit channel intensities
pub type Rgb = rgb::RGB8;

/// Backlight off
pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Full white
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Low-intensity white used while the game idles
pub const DIM: Rgb = Rgb { r: 5, g: 5, b: 5 };

pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
