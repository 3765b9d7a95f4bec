//! Light attributes compared by manual-change detection.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// The attributes a light reports about its current output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightAttributes {
    /// Brightness on the device's 0..=255 scale.
    pub brightness: Option<u8>,
    pub color_temp_kelvin: Option<u16>,
    pub rgb_color: Option<Rgb>,
}

impl LightAttributes {
    /// Whether brightness, color temperature or RGB differ from `other`.
    #[must_use]
    pub fn output_differs(&self, other: &Self) -> bool {
        self.brightness != other.brightness
            || self.color_temp_kelvin != other.color_temp_kelvin
            || self.rgb_color != other.rgb_color
    }
}
