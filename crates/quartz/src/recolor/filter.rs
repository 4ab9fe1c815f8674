use quartz_core::color::Color;

/// Restricts recoloring to values close to one of a set of target colors.
///
/// Distance is the largest RGB channel difference in 8-bit units, so a
/// tolerance of `0` matches exact colors only. A filter without targets
/// matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFilter {
    targets: Vec<Color>,
    tolerance: f32,
}

impl ColorFilter {
    pub fn new(targets: Vec<Color>, tolerance: f32) -> Self {
        Self {
            targets,
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn targets(&self) -> &[Color] {
        &self.targets
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn matches(&self, color: Color) -> bool {
        self.targets
            .iter()
            .any(|target| target.distance(color) <= self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = ColorFilter::new(Vec::new(), 0.0);
        assert!(!filter.matches(Color::default()));
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let target = Color::from_components([1.0, 0.0, 0.0, 1.0]);
        let near = Color::from_components([1.0, 10.0 / 255.0, 0.0, 0.2]);
        assert!(ColorFilter::new(vec![target], 10.5).matches(near));
        assert!(!ColorFilter::new(vec![target], 9.0).matches(near));
        assert!(ColorFilter::new(vec![target], 0.0).matches(target.with_alpha(0.0)));
    }
}
