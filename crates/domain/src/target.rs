//! Target computation — maps time of day and solar elevation to the
//! brightness and color temperature every light should converge to.

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::math::{clamp, lerp};
use crate::settings::Settings;
use crate::time::{add_hours, in_window, subtract_hours, time_difference_minutes};

/// Elevation assumed when the sun position is unknown (civil twilight).
pub const DEFAULT_SUN_ELEVATION: f64 = -6.0;

/// Elevation at which color temperature reaches its upper bound.
const FULL_DAYLIGHT_ELEVATION: f64 = 60.0;

/// Brightness and color temperature to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub brightness_pct: u8,
    pub color_temp_kelvin: u16,
}

/// Which part of the day produced the brightness of a [`Target`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Inside the night window: sleep values, no ramp.
    Night,
    /// Ramp towards the night window; `progress` goes 0 -> 1.
    WindDown { progress: f64 },
    /// Ramp out of the night window; `progress` goes 0 -> 1.
    WakeUp { progress: f64 },
    Day,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Night => f.write_str("night"),
            Self::WindDown { progress } => write!(f, "wind_down({progress:.2})"),
            Self::WakeUp { progress } => write!(f, "wake_up({progress:.2})"),
            Self::Day => f.write_str("day"),
        }
    }
}

/// Locate `now` relative to the night window and its two ramps.
#[must_use]
pub fn phase_at(now: NaiveTime, settings: &Settings) -> Phase {
    let night_start = settings.wind_down_target;
    let night_end = settings.wake_up;

    if in_window(now, night_start, night_end) {
        return Phase::Night;
    }

    let wind_down_start = subtract_hours(night_start, hours(settings.wind_down_duration));
    if in_window(now, wind_down_start, night_start) {
        return Phase::WindDown {
            progress: progress(wind_down_start, night_start, now),
        };
    }

    let wake_up_end = add_hours(night_end, hours(settings.wake_up_duration));
    if in_window(now, night_end, wake_up_end) {
        return Phase::WakeUp {
            progress: progress(night_end, wake_up_end, now),
        };
    }

    Phase::Day
}

/// Compute the target for `now` given the sun elevation in degrees.
///
/// The night window overrides everything; otherwise brightness follows the
/// ramps and color temperature follows the sun.
#[must_use]
pub fn compute_target(now: NaiveTime, sun_elevation: Option<f64>, settings: &Settings) -> Target {
    let phase = phase_at(now, settings);
    if phase == Phase::Night {
        return Target {
            brightness_pct: settings.sleep_brightness,
            color_temp_kelvin: settings.sleep_color_temp,
        };
    }

    let sleep = f64::from(settings.sleep_brightness);
    let day = f64::from(settings.max_brightness);
    let brightness = match phase {
        Phase::WindDown { progress } => lerp(day, sleep, progress),
        Phase::WakeUp { progress } => lerp(sleep, day, progress),
        Phase::Night | Phase::Day => day,
    };

    Target {
        brightness_pct: round_percent(brightness),
        color_temp_kelvin: color_temperature_for_elevation(sun_elevation, settings),
    }
}

/// Interpolate the color temperature bounds along the sun elevation.
///
/// -6° (or an unknown/non-finite reading) maps to the lower bound, 60° and
/// above to the upper bound.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_temperature_for_elevation(sun_elevation: Option<f64>, settings: &Settings) -> u16 {
    let elevation = sun_elevation
        .filter(|e| e.is_finite())
        .unwrap_or(DEFAULT_SUN_ELEVATION);
    let t = clamp(
        (elevation - DEFAULT_SUN_ELEVATION) / (FULL_DAYLIGHT_ELEVATION - DEFAULT_SUN_ELEVATION),
        0.0,
        1.0,
    );
    let kelvin = lerp(
        f64::from(settings.min_color_temp),
        f64::from(settings.max_color_temp),
        t,
    );
    kelvin.round() as u16
}

fn progress(start: NaiveTime, end: NaiveTime, now: NaiveTime) -> f64 {
    let total = time_difference_minutes(start, end);
    if total <= 0.0 {
        return 0.0;
    }
    clamp(time_difference_minutes(start, now) / total, 0.0, 1.0)
}

fn hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / 3600.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_percent(value: f64) -> u8 {
    clamp(value.round(), 0.0, 100.0) as u8
}
