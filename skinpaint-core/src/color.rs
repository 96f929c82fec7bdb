//! # Color
//!
//! Skin textures are opaque 8-bit sRGB. A [`Color`] is exactly three channels, and its canonical
//! text form is an uppercase `#RRGGBB` hex string. The two forms are always derivable from one another.

/// An opaque 8-bit sRGB color.
///
/// Equality is channel-wise.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color([u8; 3]);
impl Color {
    pub const WHITE: Self = Self([0xFF; 3]);
    pub const BLACK: Self = Self([0x00; 3]);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
    #[must_use]
    pub const fn r(self) -> u8 {
        self.0[0]
    }
    #[must_use]
    pub const fn g(self) -> u8 {
        self.0[1]
    }
    #[must_use]
    pub const fn b(self) -> u8 {
        self.0[2]
    }
    #[must_use]
    pub const fn as_array(self) -> [u8; 3] {
        self.0
    }
    /// The color with `alpha` appended.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], alpha]
    }
    /// Canonical `#RRGGBB` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.to_string()
    }
    /// Parse `#RRGGBB` or `RRGGBB`, case insensitive.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ColorParseError::Length(digits.len()));
        }
        // `from_str_radix` would also accept a sign, check digits by hand.
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(bad));
        }
        // Ascii checked above, so byte slicing is on char boundaries.
        let channel = |idx: usize| u8::from_str_radix(&digits[idx..idx + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self::new(r, g, b)),
            // Unreachable in practice - every digit was validated.
            _ => Err(ColorParseError::Length(digits.len())),
        }
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}
impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Color({self})")
    }
}
impl std::str::FromStr for Color {
    type Err = ColorParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}
impl From<Color> for [u8; 3] {
    fn from(value: Color) -> Self {
        value.0
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, found {0}")]
    Length(usize),
    #[error("{0:?} is not a hex digit")]
    Digit(char),
}
