use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An RGB label color.
///
/// Displays as six lowercase hex digits without `#`, the form the GitHub
/// labels API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Error)]
#[error("invalid color value for label \"{label}\": \"{value}\"")]
pub struct ColorParseError {
    pub label: String,
    pub value: String,
}

impl LabelColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color string with a label name for error reporting.
    ///
    /// Accepts `"RRGGBB"`, `"#RRGGBB"`, `"RGB"` and `"#RGB"`.
    ///
    /// # Errors
    ///
    /// Returns `ColorParseError` if the string is not a valid color.
    pub fn parse(s: &str, label: &str) -> Result<Self, ColorParseError> {
        let make_err = || ColorParseError {
            label: label.to_owned(),
            value: s.to_owned(),
        };

        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return Err(make_err());
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| make_err())?;
                let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| make_err())?;
                let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| make_err())?;
                Ok(Self { r, g, b })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).map_err(|_| make_err())?;
                let g = u8::from_str_radix(&hex[1..2], 16).map_err(|_| make_err())?;
                let b = u8::from_str_radix(&hex[2..3], 16).map_err(|_| make_err())?;
                Ok(Self {
                    r: r * 17,
                    g: g * 17,
                    b: b * 17,
                })
            }
            _ => Err(make_err()),
        }
    }

    /// Color of the progress label for `percent` (clamped to 0–100).
    ///
    /// Red at 0%, yellow at 50%, green at 100%, linear in between.
    pub fn progress_gradient(percent: u8) -> Self {
        let p = u32::from(percent.min(100));
        let scale = |v: u32| u8::try_from(v * 255 / 50).unwrap_or(u8::MAX);
        if p <= 50 {
            Self::new(255, scale(p), 0)
        } else {
            Self::new(scale(100 - p), 255, 0)
        }
    }
}

impl fmt::Display for LabelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for LabelColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "<label>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex_with_and_without_hash() {
        assert_eq!(LabelColor::parse("#a2eeef", "x").unwrap(), LabelColor::new(0xa2, 0xee, 0xef));
        assert_eq!(LabelColor::parse("D73A4A", "x").unwrap(), LabelColor::new(0xd7, 0x3a, 0x4a));
    }

    #[test]
    fn expands_shorthand() {
        assert_eq!(LabelColor::parse("#f0a", "x").unwrap(), LabelColor::new(0xff, 0x00, 0xaa));
    }

    #[test]
    fn rejects_bad_values() {
        for bad in ["", "#12", "zzzzzz", "#1234567", "ééé"] {
            let err = LabelColor::parse(bad, "feature").unwrap_err();
            assert_eq!(err.label, "feature");
        }
    }

    #[test]
    fn displays_without_hash() {
        assert_eq!(LabelColor::new(0, 255, 16).to_string(), "00ff10");
    }

    #[test]
    fn gradient_endpoints() {
        assert_eq!(LabelColor::progress_gradient(0).to_string(), "ff0000");
        assert_eq!(LabelColor::progress_gradient(50).to_string(), "ffff00");
        assert_eq!(LabelColor::progress_gradient(100).to_string(), "00ff00");
        assert_eq!(LabelColor::progress_gradient(200).to_string(), "00ff00");
    }

    #[test]
    fn gradient_is_monotonic_per_half() {
        let a = LabelColor::progress_gradient(10);
        let b = LabelColor::progress_gradient(40);
        assert!(a.g < b.g);
        let c = LabelColor::progress_gradient(60);
        let d = LabelColor::progress_gradient(90);
        assert!(c.r > d.r);
    }
}
