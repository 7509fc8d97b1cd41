use serde::{Deserialize, Serialize};

/// Color with RGB channels on a 0..=255 scale and a separate alpha channel.
///
/// Alpha is stored as given. Colors decoded from debug batches keep alpha on
/// a 0..=1 scale unless scaled alpha was requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(255.0, 255.0, 255.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32,
            ((hex >> 8) & 0xff) as f32,
            (hex & 0xff) as f32,
            1.0,
        )
    }

    /// Normalised `[r, g, b, a]` for GPU upload. Every channel is clamped to 0..=1,
    /// so an alpha given on the 0..=255 scale saturates to opaque.
    pub fn to_unit(self) -> [f32; 4] {
        [
            (self.r / 255.0).clamp(0.0, 1.0),
            (self.g / 255.0).clamp(0.0, 1.0),
            (self.b / 255.0).clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rgba({:.0}, {:.0}, {:.0}, {})",
            self.r, self.g, self.b, self.a
        )
    }
}
