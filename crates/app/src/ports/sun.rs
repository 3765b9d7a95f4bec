//! Sun position port.

/// Reports the current solar elevation.
pub trait SunPosition: Send + Sync {
    /// Degrees above the horizon, `None` when unknown.
    fn elevation_degrees(&self) -> Option<f64>;
}

impl<T: SunPosition> SunPosition for std::sync::Arc<T> {
    fn elevation_degrees(&self) -> Option<f64> {
        (**self).elevation_degrees()
    }
}
