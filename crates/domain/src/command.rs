//! Light commands — the `light.turn_on` writes issued by an apply sequence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::id::EntityId;

/// A single write to a light. Fields left as `None` are not touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCommand {
    pub entity_id: EntityId,
    pub brightness_pct: Option<u8>,
    pub color_temp_kelvin: Option<u16>,
    pub rgb_color: Option<Rgb>,
    pub transition: Duration,
}

impl LightCommand {
    /// Brightness-only write.
    #[must_use]
    pub fn brightness(entity_id: EntityId, brightness_pct: u8, transition: Duration) -> Self {
        Self {
            entity_id,
            brightness_pct: Some(brightness_pct),
            color_temp_kelvin: None,
            rgb_color: None,
            transition,
        }
    }

    /// Color-temperature-only write.
    #[must_use]
    pub fn color_temperature(entity_id: EntityId, kelvin: u16, transition: Duration) -> Self {
        Self {
            entity_id,
            brightness_pct: None,
            color_temp_kelvin: Some(kelvin),
            rgb_color: None,
            transition,
        }
    }

    /// RGB-only write.
    #[must_use]
    pub fn rgb(entity_id: EntityId, rgb: Rgb, transition: Duration) -> Self {
        Self {
            entity_id,
            brightness_pct: None,
            color_temp_kelvin: None,
            rgb_color: Some(rgb),
            transition,
        }
    }

    /// Whether this write touches color (temperature or RGB).
    #[must_use]
    pub fn is_color_write(&self) -> bool {
        self.color_temp_kelvin.is_some() || self.rgb_color.is_some()
    }
}
