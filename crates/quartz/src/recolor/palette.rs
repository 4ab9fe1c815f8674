use rand::Rng;

use quartz_core::color::Color;
use quartz_parser::error::{Diagnostic, ErrorCode};

/// One palette color and its position on the palette's time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteStop {
    pub color: Color,
    pub time: f32,
}

impl PaletteStop {
    pub fn new(color: Color, time: f32) -> Self {
        Self { color, time }
    }
}

/// An ordered, non-empty list of color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<PaletteStop>,
}

impl Palette {
    /// Build a palette, ordering stops by time.
    pub fn new(mut stops: Vec<PaletteStop>) -> Result<Self, Diagnostic> {
        if stops.is_empty() {
            return Err(Diagnostic::error("palette has no colors")
                .with_code(ErrorCode::E302)
                .with_help("add at least one color to the palette"));
        }
        stops.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { stops })
    }

    /// Colors spread evenly over `[0, 1]`.
    pub fn from_colors(colors: &[Color]) -> Result<Self, Diagnostic> {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(index, color)| PaletteStop::new(*color, index as f32 / last))
                .collect(),
        )
    }

    /// Parse stops written as CSS colors with an optional `@time` suffix,
    /// e.g. `["#ff0000", "orange@0.5", "rgb(255 255 0)"]`.
    ///
    /// Stops without an explicit time take their evenly spaced position.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, String> {
        let last = specs.len().saturating_sub(1).max(1) as f32;
        let stops = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let spec = spec.as_ref().trim();
                let (color, time) = match spec.rsplit_once('@') {
                    Some((color, time)) => {
                        let time = time
                            .trim()
                            .parse::<f32>()
                            .map_err(|err| {
                                format!("invalid time in palette stop `{spec}`: {err}")
                            })?;
                        (color, time)
                    }
                    None => (spec, index as f32 / last),
                };
                let color = Color::new(color.trim())
                    .map_err(|err| format!("invalid color in palette stop `{spec}`: {err}"))?;
                Ok(PaletteStop::new(color, time))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Self::new(stops).map_err(|err| err.message().to_string())
    }

    pub fn stops(&self) -> &[PaletteStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Times of the first and last stop.
    pub fn time_range(&self) -> (f32, f32) {
        let first = self.stops.first().map_or(0.0, |stop| stop.time);
        let last = self.stops.last().map_or(first, |stop| stop.time);
        (first, last)
    }

    /// Interpolate the palette at `time`, clamped to the stop range.
    pub fn sample(&self, time: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::default();
        };
        if time <= first.time {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if time <= to.time {
                let span = to.time - from.time;
                if span <= f32::EPSILON {
                    return to.color;
                }
                return from.color.lerp(to.color, (time - from.time) / span);
            }
        }
        self.stops.last().map_or(first.color, |stop| stop.color)
    }

    /// A uniformly chosen stop color.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        let index = rng.random_range(0..self.stops.len());
        self.stops[index].color
    }

    /// Returns `true` if every stop is pure black or pure white.
    pub fn is_black_and_white(&self) -> bool {
        self.stops.iter().all(|stop| stop.color.is_black_or_white())
    }
}
