//! Black-or-white text color selection for a background color.

use std::fmt;

use palette::Srgb;
use serde::Serialize;

use crate::error::{PaletteError, Result};

/// Foreground color that stays readable on a given background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextColor::Black => "black",
            TextColor::White => "white",
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `#rrggbb` or `rrggbb`.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PaletteError::MalformedHex(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| PaletteError::MalformedHex(hex.to_string()))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Perceived brightness in 0.0..=1.0 using Rec. 601 weights.
#[inline]
pub fn luminance(color: Srgb<u8>) -> f64 {
    (0.299 * color.red as f64 + 0.587 * color.green as f64 + 0.114 * color.blue as f64) / 255.0
}

/// Pick black text for light backgrounds, white otherwise. Exactly 0.5 is
/// treated as dark.
pub fn text_color(background: Srgb<u8>) -> TextColor {
    if luminance(background) > 0.5 {
        TextColor::Black
    } else {
        TextColor::White
    }
}

/// [`text_color`] for a hex string.
pub fn text_color_for(hex: &str) -> Result<TextColor> {
    parse_hex(hex).map(text_color)
}
