//! Settings — the configuration of one controller activation.
//!
//! A [`Settings`] value is immutable once built; reconfiguration replaces it
//! as a whole.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveTime;

use crate::error::{CircadiaError, ValidationError};
use crate::id::EntityId;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);
pub const DEFAULT_TRANSITION: Duration = Duration::from_secs(2);
pub const DEFAULT_WIND_DOWN_DURATION: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_WAKE_UP_DURATION: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SLEEP_BRIGHTNESS: u8 = 1;
pub const DEFAULT_MAX_BRIGHTNESS: u8 = 100;
pub const DEFAULT_SLEEP_COLOR_TEMP: u16 = 2200;
pub const DEFAULT_MIN_COLOR_TEMP: u16 = 2200;
pub const DEFAULT_MAX_COLOR_TEMP: u16 = 6500;

/// Default start of the night window.
#[must_use]
pub fn default_wind_down_target() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Default end of the night window.
#[must_use]
pub fn default_wake_up() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 30, 0).unwrap_or(NaiveTime::MIN)
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Period of the corrective tick.
    pub interval: Duration,
    /// Transition passed to every write, and the pause between the brightness
    /// and the color write.
    pub transition: Duration,
    /// Start of the night window.
    pub wind_down_target: NaiveTime,
    /// End of the night window.
    pub wake_up: NaiveTime,
    /// Width of the ramp ending at `wind_down_target`.
    pub wind_down_duration: Duration,
    /// Width of the ramp starting at `wake_up`.
    pub wake_up_duration: Duration,
    pub sleep_brightness: u8,
    /// Brightness outside the night window and the ramps.
    pub max_brightness: u8,
    pub sleep_color_temp: u16,
    pub min_color_temp: u16,
    pub max_color_temp: u16,
    /// Lights the controller never touches.
    pub exclude_entities: BTreeSet<EntityId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            transition: DEFAULT_TRANSITION,
            wind_down_target: default_wind_down_target(),
            wake_up: default_wake_up(),
            wind_down_duration: DEFAULT_WIND_DOWN_DURATION,
            wake_up_duration: DEFAULT_WAKE_UP_DURATION,
            sleep_brightness: DEFAULT_SLEEP_BRIGHTNESS,
            max_brightness: DEFAULT_MAX_BRIGHTNESS,
            sleep_color_temp: DEFAULT_SLEEP_COLOR_TEMP,
            min_color_temp: DEFAULT_MIN_COLOR_TEMP,
            max_color_temp: DEFAULT_MAX_COLOR_TEMP,
            exclude_entities: BTreeSet::new(),
        }
    }
}

impl Settings {
    /// Create a builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Whether `entity_id` is on the exclusion list.
    #[must_use]
    pub fn is_excluded(&self, entity_id: &EntityId) -> bool {
        self.exclude_entities.contains(entity_id)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::Validation`] when:
    /// - `interval` is zero ([`ValidationError::ZeroInterval`])
    /// - a brightness exceeds 100 ([`ValidationError::BrightnessOutOfRange`])
    /// - `sleep_brightness > max_brightness` ([`ValidationError::SleepBrighterThanDay`])
    /// - a color temperature is zero ([`ValidationError::ZeroColorTemperature`])
    /// - `min_color_temp > max_color_temp` ([`ValidationError::InvertedColorTemperatureBounds`])
    pub fn validate(&self) -> Result<(), CircadiaError> {
        if self.interval.is_zero() {
            return Err(ValidationError::ZeroInterval.into());
        }
        for brightness in [self.sleep_brightness, self.max_brightness] {
            if brightness > 100 {
                return Err(ValidationError::BrightnessOutOfRange(brightness).into());
            }
        }
        if self.sleep_brightness > self.max_brightness {
            return Err(ValidationError::SleepBrighterThanDay {
                sleep: self.sleep_brightness,
                day: self.max_brightness,
            }
            .into());
        }
        if self.min_color_temp == 0 || self.max_color_temp == 0 || self.sleep_color_temp == 0 {
            return Err(ValidationError::ZeroColorTemperature.into());
        }
        if self.min_color_temp > self.max_color_temp {
            return Err(ValidationError::InvertedColorTemperatureBounds {
                min: self.min_color_temp,
                max: self.max_color_temp,
            }
            .into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    inner: Settings,
}

impl SettingsBuilder {
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.inner.interval = interval;
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: Duration) -> Self {
        self.inner.transition = transition;
        self
    }

    #[must_use]
    pub fn night_window(mut self, wind_down_target: NaiveTime, wake_up: NaiveTime) -> Self {
        self.inner.wind_down_target = wind_down_target;
        self.inner.wake_up = wake_up;
        self
    }

    #[must_use]
    pub fn ramps(mut self, wind_down: Duration, wake_up: Duration) -> Self {
        self.inner.wind_down_duration = wind_down;
        self.inner.wake_up_duration = wake_up;
        self
    }

    #[must_use]
    pub fn sleep(mut self, brightness: u8, color_temp: u16) -> Self {
        self.inner.sleep_brightness = brightness;
        self.inner.sleep_color_temp = color_temp;
        self
    }

    #[must_use]
    pub fn max_brightness(mut self, brightness: u8) -> Self {
        self.inner.max_brightness = brightness;
        self
    }

    #[must_use]
    pub fn color_temp_bounds(mut self, min: u16, max: u16) -> Self {
        self.inner.min_color_temp = min;
        self.inner.max_color_temp = max;
        self
    }

    #[must_use]
    pub fn exclude(mut self, entity_id: EntityId) -> Self {
        self.inner.exclude_entities.insert(entity_id);
        self
    }

    /// Consume the builder, validate, and return the [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::Validation`] if an invariant fails.
    pub fn build(self) -> Result<Settings, CircadiaError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
