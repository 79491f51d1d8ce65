//! RGB colors for the renderer boundary.

use std::fmt;
use std::str::FromStr;

use crate::error::{QuillError, Result};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::new(0.0, 0.5, 0.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Build from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::new(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0)
    }

    /// 8-bit components, for hex formatting.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    fn named(name: &str) -> Option<Color> {
        let c = match name {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "yellow" => Color::new(1.0, 1.0, 0.0),
            "cyan" => Color::new(0.0, 1.0, 1.0),
            "magenta" => Color::new(1.0, 0.0, 1.0),
            "orange" => Color::from_rgb8(0xff, 0xa5, 0x00),
            "purple" => Color::from_rgb8(0x80, 0x00, 0x80),
            "gray" | "grey" => Color::new(0.5, 0.5, 0.5),
            _ => return None,
        };
        Some(c)
    }

    fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#')?;
        match digits.len() {
            3 => {
                let v = u32::from_str_radix(digits, 16).ok()?;
                let (r, g, b) = ((v >> 8) & 0xf, (v >> 4) & 0xf, v & 0xf);
                Some(Color::from_rgb8((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
            },
            6 => {
                let v = u32::from_str_radix(digits, 16).ok()?;
                Some(Color::from_rgb8(
                    ((v >> 16) & 0xff) as u8,
                    ((v >> 8) & 0xff) as u8,
                    (v & 0xff) as u8,
                ))
            },
            _ => None,
        }
    }

    /// Parse a comma triple of unit floats, e.g. `0.2,0.4,1`.
    fn from_triple(s: &str) -> Option<Color> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut c = [0.0f64; 3];
        for (slot, part) in c.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }
        Some(Color::new(c[0], c[1], c[2]))
    }
}

impl FromStr for Color {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Color> {
        let trimmed = s.trim();
        Color::named(&trimmed.to_ascii_lowercase())
            .or_else(|| Color::from_hex(trimmed))
            .or_else(|| Color::from_triple(trimmed))
            .ok_or_else(|| QuillError::InvalidValue {
                type_name: "color".into(),
                raw: s.to_string(),
            })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}
