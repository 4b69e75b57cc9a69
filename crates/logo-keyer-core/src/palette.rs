//! Reference colors, palettes and thresholds used by the keyer.
//!
//! A [`Palette`] is a non-empty list of named background tones. Matching is
//! "closest within threshold", so the order of entries never changes which
//! pixels are keyed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default keying distance for the brand palette
pub const DEFAULT_THRESHOLD: f64 = 25.0;

/// An 8-bit RGB triple. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Squared Euclidean distance in RGB space
    #[inline]
    pub fn distance_squared(&self, other: &Rgb) -> u32 {
        let dr = self.0 as i32 - other.0 as i32;
        let dg = self.1 as i32 - other.1 as i32;
        let db = self.2 as i32 - other.2 as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space
    pub fn distance(&self, other: &Rgb) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `#0A0F1F`, `0A0F1F` or `10,15,31`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::Configuration(format!("Invalid color '{}'", s));

        if s.contains(',') {
            let parts: Vec<u8> = s
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<core::result::Result<_, _>>()
                .map_err(|_| invalid())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Rgb(*r, *g, *b)),
                _ => Err(invalid()),
            };
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// A reference color with a preset name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    pub rgb: Rgb,
}

impl NamedColor {
    pub fn new(name: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }
}

/// Non-empty set of background colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<NamedColor>,
}

impl Palette {
    /// Build a palette, rejecting an empty color list
    pub fn new(colors: Vec<NamedColor>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::Configuration(
                "Palette must contain at least one color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Build an unnamed palette from bare triples
    pub fn from_colors<I: IntoIterator<Item = Rgb>>(colors: I) -> Result<Self> {
        Self::new(
            colors
                .into_iter()
                .map(|rgb| NamedColor::new(rgb.to_string(), rgb))
                .collect(),
        )
    }

    /// Brand navy, charcoal, pure black and two navy shades seen in exports
    pub fn brand_default() -> Self {
        Self {
            colors: brand_presets(),
        }
    }

    /// Keep only the named presets, in the order requested
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let picked = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.colors
                    .iter()
                    .find(|c| c.name == name)
                    .cloned()
                    .ok_or_else(|| Error::Configuration(format!("Unknown palette preset '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(picked)
    }

    pub fn colors(&self) -> &[NamedColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no colors
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether `rgb` lies within `threshold` of any entry (inclusive)
    #[inline]
    pub fn matches(&self, rgb: &Rgb, threshold: Threshold) -> bool {
        let limit = threshold.value();
        self.colors.iter().any(|c| c.rgb.distance(rgb) <= limit)
    }
}

/// Maximum RGB distance at which a pixel counts as background
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Reject negative, NaN and infinite values
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Configuration(format!(
                "Threshold must be a finite number >= 0, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

/// The consolidated brand preset table
pub fn brand_presets() -> Vec<NamedColor> {
    vec![
        NamedColor::new("brand-navy", Rgb(10, 15, 31)),
        NamedColor::new("brand-charcoal", Rgb(13, 13, 13)),
        NamedColor::new("black", Rgb(0, 0, 0)),
        NamedColor::new("navy-shade-1", Rgb(11, 16, 32)),
        NamedColor::new("navy-shade-2", Rgb(12, 17, 33)),
    ]
}
