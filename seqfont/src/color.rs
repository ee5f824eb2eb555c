//! `#RRGGBBAA` colors as they appear in scheme files.

use std::{fmt, str::FromStr};

use write_fonts::tables::cpal::ColorRecord;

/// An 8-bit-per-channel color with straight alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// The reason a color string was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected a color of the form '#RRGGBBAA', found '{0}'")]
pub struct InvalidColor(pub String);

impl Rgba {
    /// Opaque black, used for letters a scheme does not mention.
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 0xFF);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Rgba {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// The color as a CSS `#RRGGBB` string, dropping alpha.
    pub fn to_hex6(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// The color in the form used by a CPAL color record.
    pub fn to_color_record(self) -> ColorRecord {
        ColorRecord {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha: self.alpha,
        }
    }
}

impl FromStr for Rgba {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Rgba::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}
