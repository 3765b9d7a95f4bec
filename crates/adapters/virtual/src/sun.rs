//! Sun position source that never moves.

use circadia_app::ports::SunPosition;

/// Reports a configured elevation, or nothing when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedSun {
    elevation: Option<f64>,
}

impl FixedSun {
    #[must_use]
    pub fn new(elevation: Option<f64>) -> Self {
        Self { elevation }
    }
}

impl SunPosition for FixedSun {
    fn elevation_degrees(&self) -> Option<f64> {
        self.elevation
    }
}
