//! Color mapping utilities for SVG visualization.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    /// A neutral grey at `level` in [0.0, 1.0] (0 is black).
    pub(crate) fn grey(level: f64) -> Self {
        let v = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r: v, g: v, b: v }
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// HSL color: h in degrees, s and l in [0.0, 1.0].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Hsl {
    pub(crate) h: f64,
    pub(crate) s: f64,
    pub(crate) l: f64,
}

impl fmt::Display for Hsl {
    /// Format as CSS HSL:
    ///   hsl({h:.1},{s:.0}%,{l:.0}%)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // normalize hue into [0,360)
        let h = (self.h % 360.0 + 360.0) % 360.0;
        let s = (self.s * 100.0).clamp(0.0, 100.0);
        let l = (self.l * 100.0).clamp(0.0, 100.0);
        write!(f, "hsl({:.1},{:.0}%,{:.0}%)", h, s, l)
    }
}

const GAMMA: f64 = 2.2;

/// `n` greys from `start` to `end`, evenly spaced in gamma-2.2 space
/// (the same ramp as R's `gray.colors`).
pub(crate) fn grey_ramp(n: usize, start: f64, end: f64) -> Vec<Rgb> {
    let (a, b) = (start.powf(GAMMA), end.powf(GAMMA));
    (0..n)
        .map(|i| match i {
            0 => Rgb::grey(start),
            i if i + 1 == n => Rgb::grey(end),
            i => {
                let t = i as f64 / (n - 1) as f64;
                Rgb::grey((a + (b - a) * t).powf(1.0 / GAMMA))
            }
        })
        .collect()
}

const GOLDEN_ANGLE: f64 = 137.50776405;

/// Well-separated hues for categorical series.
pub(crate) fn golden_angle_color(index: usize) -> Hsl {
    Hsl { h: ((index as f64) * GOLDEN_ANGLE) % 360.0, s: 0.70, l: 0.45 }
}
