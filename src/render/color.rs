//! Maps a gas value onto a low-cost -> high-cost color gradient.

use crate::model::GasRange;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parses `#rrggbb` or `rrggbb`.
impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("color must be #rrggbb: {}", s);
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Relative position of `gas` inside `range`, in [0, 1].
///
/// No range (nothing measured) or a degenerate range puts every value at 0.
pub fn position(gas: u64, range: Option<GasRange>) -> f64 {
    match range {
        Some(GasRange { min, max }) if max > min => {
            let p = (gas as f64 - min as f64) / (max as f64 - min as f64);
            p.clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScale {
    pub low: Rgb,
    pub high: Rgb,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            low: Rgb::GREEN,
            high: Rgb::RED,
        }
    }
}

impl ColorScale {
    pub fn at(&self, p: f64) -> Rgb {
        let lerp = |lo: u8, hi: u8| -> u8 {
            let v = lo as f64 + (hi as f64 - lo as f64) * p;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            lerp(self.low.r, self.high.r),
            lerp(self.low.g, self.high.g),
            lerp(self.low.b, self.high.b),
        )
    }

    pub fn color_for(&self, gas: u64, range: Option<GasRange>) -> Rgb {
        self.at(position(gas, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RANGE: Option<GasRange> = Some(GasRange {
        min: 1000,
        max: 2000,
    });

    #[test]
    fn endpoints_map_to_endpoint_colors() {
        let scale = ColorScale::default();
        assert_eq!(scale.color_for(1000, RANGE), Rgb::GREEN);
        assert_eq!(scale.color_for(2000, RANGE), Rgb::RED);
        assert_eq!(scale.color_for(1500, RANGE), Rgb::new(128, 128, 0));
    }

    #[test]
    fn position_is_monotonic_and_clamped() {
        let mut last = 0.0;
        for gas in (0..=3000).step_by(50) {
            let p = position(gas, RANGE);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last, "gas {gas}");
            last = p;
        }
    }

    #[test]
    fn degenerate_or_missing_range_is_zero() {
        let flat = Some(GasRange { min: 42, max: 42 });
        for gas in [0, 42, 10_000] {
            assert_eq!(position(gas, flat), 0.0);
            assert_eq!(position(gas, None), 0.0);
        }
    }

    #[test]
    fn custom_scale_interpolates_each_channel() {
        let scale = ColorScale {
            low: Rgb::new(0, 0, 0),
            high: Rgb::new(255, 100, 10),
        };
        assert_eq!(scale.at(0.5), Rgb::new(128, 50, 5));
        assert_eq!(scale.at(1.0), Rgb::new(255, 100, 10));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!("#00ff00".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert_eq!("FF0000".parse::<Rgb>().unwrap(), Rgb::RED);
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("zzzzzz".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }
}
