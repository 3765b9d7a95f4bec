//! Light entities as observed through the registry and the event stream.
//!
//! A [`LightSnapshot`] is a point-in-time view of one light: on/off state,
//! what it can do, and the attributes it currently reports.

mod attributes;
mod state;

pub use attributes::LightAttributes;
pub use state::EntityState;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::time::Timestamp;

/// What a light advertises it can be driven with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCapabilities {
    pub brightness: bool,
    pub color_temp: bool,
    pub hs: bool,
    pub rgb: bool,
}

impl LightCapabilities {
    /// A dimmable white-spectrum light.
    #[must_use]
    pub const fn color_temp() -> Self {
        Self {
            brightness: true,
            color_temp: true,
            hs: false,
            rgb: false,
        }
    }

    /// A dimmable RGB-only light.
    #[must_use]
    pub const fn rgb() -> Self {
        Self {
            brightness: true,
            color_temp: false,
            hs: false,
            rgb: true,
        }
    }

    /// A dimmable light without any color control.
    #[must_use]
    pub const fn dimmable() -> Self {
        Self {
            brightness: true,
            color_temp: false,
            hs: false,
            rgb: false,
        }
    }

    /// How the controller should drive color on this light, if at all.
    ///
    /// Lights without brightness control are never driven. Color temperature
    /// wins over hue/saturation and RGB.
    #[must_use]
    pub fn color_mode(&self) -> Option<ColorMode> {
        if !self.brightness {
            return None;
        }
        if self.color_temp {
            Some(ColorMode::ColorTemperature)
        } else if self.hs || self.rgb {
            Some(ColorMode::Rgb)
        } else {
            None
        }
    }
}

/// How the color half of an apply sequence is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    ColorTemperature,
    Rgb,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColorTemperature => f.write_str("ct"),
            Self::Rgb => f.write_str("rgb"),
        }
    }
}

/// Point-in-time view of a light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSnapshot {
    pub entity_id: EntityId,
    pub state: EntityState,
    pub capabilities: LightCapabilities,
    pub attributes: LightAttributes,
    /// When the state or an attribute last changed.
    pub last_changed: Timestamp,
}

impl LightSnapshot {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}
