//! Color-temperature to RGB approximation for lights without a native
//! color-temperature mode.

use serde::{Deserialize, Serialize};

use crate::math::clamp;

const MIN_KELVIN: f64 = 1_000.0;
const MAX_KELVIN: f64 = 40_000.0;
const MAX_CHANNEL: f64 = 255.0;

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        [value.r, value.g, value.b]
    }
}

/// Approximate the RGB appearance of a black-body color temperature.
///
/// The input is clamped to 1000K..=40000K and evaluated in hundreds of Kelvin.
/// Channels are clamped to 0..=255 and truncated.
#[must_use]
pub fn color_temperature_to_rgb(kelvin: u32) -> Rgb {
    let k = clamp(f64::from(kelvin), MIN_KELVIN, MAX_KELVIN) / 100.0;

    let red = if k <= 66.0 {
        MAX_CHANNEL
    } else {
        329.698_727_446 * (k - 60.0).powf(-0.133_204_759_2)
    };

    let green = if k <= 66.0 {
        99.470_802_586_1 * k - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (k - 60.0).powf(-0.075_514_849_2)
    };

    let blue = if k >= 66.0 {
        MAX_CHANNEL
    } else if k <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (k - 10.0) - 305.044_792_730_7
    };

    Rgb::new(channel(red), channel(green), channel(blue))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f64) -> u8 {
    clamp(value, 0.0, MAX_CHANNEL) as u8
}
