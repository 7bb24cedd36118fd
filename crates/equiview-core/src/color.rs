//! CSS color strings used by panel records and the scene configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Empty color string")]
    Empty,
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// 8-bit straight-alpha RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, a])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }

    /// Normalized `[r, g, b, a]` in 0.0-1.0
    pub fn to_f32_array(&self) -> [f32; 4] {
        self.0.map(|c| c as f32 / 255.0)
    }

    /// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a basic named color
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(s.to_string()));
        }

        named(s).ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }

    /// Parse, falling back to `fallback` for anything unparseable
    pub fn parse_or(s: &str, fallback: Rgba) -> Self {
        Self::parse(s).unwrap_or(fallback)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgba> {
    let rgba = match name.to_ascii_lowercase().as_str() {
        "white" => Rgba::rgb(255, 255, 255),
        "black" => Rgba::rgb(0, 0, 0),
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "lime" => Rgba::rgb(0, 255, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "yellow" => Rgba::rgb(255, 255, 0),
        "orange" => Rgba::rgb(255, 165, 0),
        "cyan" | "aqua" => Rgba::rgb(0, 255, 255),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "transparent" => Rgba([0, 0, 0, 0]),
        _ => return None,
    };
    Some(rgba)
}
