//! Color handling for VFX documents
//!
//! This module provides the [`Color`] type which wraps the sRGB
//! `AlphaColor` type from the color crate. Documents store colors as
//! normalized `vec4` literals (`{ r, g, b, a }` in `0..=1`); palettes and
//! filters may also be written as CSS color strings.

use std::{fmt, str::FromStr};

use color::{AlphaColor, Hsl, Srgb, parse_color};

/// Wrapper around an sRGB `AlphaColor` from the color crate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: AlphaColor<Srgb>,
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff0000"`,
    /// `"rgb(255, 0, 0)"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quartz_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// assert_eq!(red.components(), [1.0, 0.0, 0.0, 1.0]);
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match parse_color(color_str) {
            Ok(color) => Ok(Self {
                color: color.to_alpha_color::<Srgb>(),
            }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Create a color from normalized `[r, g, b, a]` components.
    pub fn from_components(components: [f32; 4]) -> Self {
        Self {
            color: AlphaColor::new(components),
        }
    }

    /// Create a color from a `vec3`/`vec4` literal. A missing alpha is
    /// treated as opaque; any other length is rejected.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match *values {
            [r, g, b] => Some(Self::from_components([r, g, b, 1.0])),
            [r, g, b, a] => Some(Self::from_components([r, g, b, a])),
            _ => None,
        }
    }

    /// Create a color from hue (degrees), saturation and lightness
    /// (both `0..=100`), and alpha.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let hsl = AlphaColor::<Hsl>::new([
            hue,
            saturation.clamp(0.0, 100.0),
            lightness.clamp(0.0, 100.0),
            alpha,
        ]);
        let [r, g, b, a] = hsl.convert::<Srgb>().components;
        Self::from_components([clamp_unit(r), clamp_unit(g), clamp_unit(b), a])
    }

    /// Normalized `[r, g, b, a]` components.
    pub fn components(&self) -> [f32; 4] {
        self.color.components
    }

    /// The components as written to a document literal of `width` values.
    pub fn to_literal(&self, width: usize) -> Vec<f32> {
        self.components().into_iter().take(width.clamp(3, 4)).collect()
    }

    /// Returns `[hue, saturation, lightness]`, hue in degrees and the other
    /// two in `0..=100`. Achromatic colors report a hue of `0`.
    pub fn to_hsl(&self) -> [f32; 3] {
        let [h, s, l, _] = self.color.convert::<Hsl>().components;
        let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
        [h, if s.is_finite() { s } else { 0.0 }, l]
    }

    /// Shift hue (degrees), saturation and lightness (percentage points).
    ///
    /// Colors with a channel above 1 are scaled into range for the HSL
    /// conversion and back out afterwards, so their magnitude survives. A
    /// zero shift returns the color unchanged.
    pub fn shift_hsl(self, hue: f32, saturation: f32, lightness: f32) -> Self {
        if hue == 0.0 && saturation == 0.0 && lightness == 0.0 {
            return self;
        }
        self.within_unit_range(|unit| {
            let [h, s, l] = unit.to_hsl();
            Color::from_hsl(h + hue, s + saturation, l + lightness, unit.alpha())
        })
    }

    /// Replace the hue, keeping saturation, lightness and magnitude.
    pub fn with_hue(self, hue: f32) -> Self {
        self.within_unit_range(|unit| {
            let [_, s, l] = unit.to_hsl();
            Color::from_hsl(hue, s, l, unit.alpha())
        })
    }

    fn within_unit_range(self, convert: impl FnOnce(Color) -> Color) -> Self {
        let [r, g, b, a] = self.components();
        let scale = r.max(g).max(b).max(1.0);
        if !scale.is_finite() {
            return convert(self);
        }
        let unit = Self::from_components([r / scale, g / scale, b / scale, a]);
        let [r, g, b, _] = convert(unit).components();
        Self::from_components([r * scale, g * scale, b * scale, a])
    }

    /// Returns the alpha component.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Creates a new color with the specified alpha value.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.components();
        Self::from_components([r, g, b, alpha])
    }

    /// Component-wise linear interpolation towards `other`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let a = self.components();
        let b = other.components();
        Self::from_components(std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t))
    }

    /// Largest per-channel RGB difference, in 8-bit units (`0..=255`).
    /// Alpha is ignored.
    pub fn distance(self, other: Color) -> f32 {
        let a = self.components();
        let b = other.components();
        (0..3)
            .map(|i| (a[i] - b[i]).abs() * 255.0)
            .fold(0.0, f32::max)
    }

    /// Returns `true` for pure black or pure white (alpha ignored).
    pub fn is_black_or_white(self) -> bool {
        let [r, g, b, _] = self.components();
        let all = |v: f32| [r, g, b].iter().all(|c| (c - v).abs() < 1e-4);
        all(0.0) || all(1.0)
    }

    /// `#rrggbbaa` representation.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.components().map(|c| (clamp_unit(c) * 255.0).round() as u8);
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_components([0.0, 0.0, 0.0, 1.0])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(
            Color::from_slice(&[1.0, 0.5, 0.0]).unwrap().components(),
            [1.0, 0.5, 0.0, 1.0]
        );
        assert!(Color::from_slice(&[1.0, 0.5]).is_none());
    }

    #[test]
    fn test_hsl_round_trip_red() {
        let red = Color::from_components([1.0, 0.0, 0.0, 0.5]);
        let [h, s, l] = red.to_hsl();
        assert!(approx_eq!(f32, h, 0.0, epsilon = 0.01));
        assert!(approx_eq!(f32, s, 100.0, epsilon = 0.01));
        assert!(approx_eq!(f32, l, 50.0, epsilon = 0.01));

        let back = Color::from_hsl(h, s, l, red.alpha());
        let [r, g, b, a] = back.components();
        assert!(approx_eq!(f32, r, 1.0, epsilon = 0.001));
        assert!(approx_eq!(f32, g, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, b, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, a, 0.5, epsilon = 0.001));
    }

    #[test]
    fn test_from_hsl_green() {
        let [r, g, b, _] = Color::from_hsl(120.0, 100.0, 50.0, 1.0).components();
        assert!(approx_eq!(f32, r, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, g, 1.0, epsilon = 0.001));
        assert!(approx_eq!(f32, b, 0.0, epsilon = 0.001));
    }

    #[test]
    fn test_grey_hue_is_zero() {
        let [h, _, _] = Color::from_components([0.5, 0.5, 0.5, 1.0]).to_hsl();
        assert!(approx_eq!(f32, h, 0.0, epsilon = 0.001));
    }

    #[test]
    fn test_zero_shift_keeps_bright_colors() {
        let bright = Color::from_components([2.0, 1.0, 0.5, 1.0]);
        assert_eq!(bright.shift_hsl(0.0, 0.0, 0.0), bright);
    }

    #[test]
    fn test_hue_change_keeps_magnitude() {
        let bright = Color::from_components([2.0, 0.0, 0.0, 0.5]);
        let [r, g, b, a] = bright.with_hue(120.0).components();
        assert!(approx_eq!(f32, r, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, g, 2.0, epsilon = 0.001));
        assert!(approx_eq!(f32, b, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, a, 0.5));

        let [r, g, b, _] = bright.shift_hsl(0.0, 0.0, -25.0).components();
        assert!(approx_eq!(f32, r, 1.0, epsilon = 0.001));
        assert!(approx_eq!(f32, g, 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, b, 0.0, epsilon = 0.001));
    }

    #[test]
    fn test_lerp_midpoint() {
        let black = Color::from_components([0.0, 0.0, 0.0, 1.0]);
        let white = Color::from_components([1.0, 1.0, 1.0, 1.0]);
        let [r, g, b, a] = black.lerp(white, 0.5).components();
        assert!(approx_eq!(f32, r, 0.5));
        assert!(approx_eq!(f32, g, 0.5));
        assert!(approx_eq!(f32, b, 0.5));
        assert!(approx_eq!(f32, a, 1.0));
    }

    #[test]
    fn test_distance_ignores_alpha() {
        let a = Color::from_components([1.0, 0.0, 0.0, 1.0]);
        let b = Color::from_components([1.0, 0.0, 0.0, 0.0]);
        assert!(approx_eq!(f32, a.distance(b), 0.0));
        let c = Color::from_components([0.9, 0.0, 0.0, 1.0]);
        assert!(approx_eq!(f32, a.distance(c), 25.5, epsilon = 0.01));
    }

    #[test]
    fn test_black_or_white() {
        assert!(Color::default().is_black_or_white());
        assert!(Color::from_components([1.0, 1.0, 1.0, 0.2]).is_black_or_white());
        assert!(!Color::from_components([1.0, 0.0, 1.0, 1.0]).is_black_or_white());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(
            Color::from_components([1.0, 0.5, 0.0, 1.0]).to_hex(),
            "#ff8000ff"
        );
    }
}
