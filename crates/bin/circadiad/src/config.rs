//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `circadia.toml` in the working directory, or at the path named
//! by `CIRCADIA_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use circadia_adapter_virtual::VirtualLight;
use circadia_domain::entity::LightCapabilities;
use circadia_domain::error::{CircadiaError, ValidationError};
use circadia_domain::id::EntityId;
use circadia_domain::settings::{self, Settings};
use circadia_domain::time::{Timestamp, parse_time_of_day};

const DEFAULT_PATH: &str = "circadia.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Controller settings.
    pub lighting: LightingConfig,
    /// Sun position source.
    pub sun: SunConfig,
    /// Simulated lights.
    pub lights: Vec<LightConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Adaptive lighting settings, as written by a human.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Whether automation starts enabled.
    pub enabled: bool,
    pub interval_secs: u64,
    pub transition_secs: f64,
    /// Start of the night window, `HH:MM`.
    pub wind_down_target: String,
    /// End of the night window, `HH:MM`.
    pub wake_up: String,
    pub wind_down_minutes: u64,
    pub wake_up_minutes: u64,
    pub sleep_brightness: u8,
    pub max_brightness: u8,
    pub sleep_color_temp: u16,
    pub min_color_temp: u16,
    pub max_color_temp: u16,
    /// Entity ids the controller must never touch.
    pub exclude: Vec<String>,
}

/// Sun position configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Fixed solar elevation in degrees; unknown when absent.
    pub elevation: Option<f64>,
}

/// One simulated light.
#[derive(Debug, Deserialize)]
pub struct LightConfig {
    pub entity_id: String,
    #[serde(default = "default_true")]
    pub color_temp: bool,
    #[serde(default)]
    pub rgb: bool,
    /// Initial brightness in percent.
    #[serde(default)]
    pub brightness: Option<u8>,
    /// Whether the light starts on.
    #[serde(default)]
    pub on: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from `circadia.toml` (or `CIRCADIA_CONFIG`), then
    /// apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting settings are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CIRCADIA_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CIRCADIA_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = lookup("CIRCADIA_INTERVAL").and_then(|val| val.parse().ok()) {
            self.lighting.interval_secs = secs;
        }
        if let Some(val) = lookup("CIRCADIA_WIND_DOWN") {
            self.lighting.wind_down_target = val;
        }
        if let Some(val) = lookup("CIRCADIA_WAKE_UP") {
            self.lighting.wake_up = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.to_settings()?;
        for light in &self.lights {
            light.parsed_entity_id()?;
            if let Some(brightness) = light.brightness.filter(|b| *b > 100) {
                return Err(ValidationError::BrightnessOutOfRange(brightness).into());
            }
        }
        Ok(())
    }

    /// Turn the `[lighting]` section into validated controller settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for unparsable times, durations or
    /// entity ids, and for settings that break a domain invariant.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let lighting = &self.lighting;
        let transition = Duration::try_from_secs_f64(lighting.transition_secs).map_err(|_| {
            ValidationError::InvalidDuration(lighting.transition_secs.to_string())
        })?;
        let mut builder = Settings::builder()
            .interval(Duration::from_secs(lighting.interval_secs))
            .transition(transition)
            .night_window(
                parse_time_of_day(&lighting.wind_down_target)?,
                parse_time_of_day(&lighting.wake_up)?,
            )
            .ramps(
                Duration::from_secs(lighting.wind_down_minutes.saturating_mul(60)),
                Duration::from_secs(lighting.wake_up_minutes.saturating_mul(60)),
            )
            .sleep(lighting.sleep_brightness, lighting.sleep_color_temp)
            .max_brightness(lighting.max_brightness)
            .color_temp_bounds(lighting.min_color_temp, lighting.max_color_temp);
        for entity_id in &lighting.exclude {
            builder = builder.exclude(entity_id.parse::<EntityId>()?);
        }
        Ok(builder.build()?)
    }

    /// Build the simulated lights, stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an invalid entity id.
    pub fn virtual_lights(&self, at: Timestamp) -> Result<Vec<VirtualLight>, ConfigError> {
        self.lights
            .iter()
            .map(|light| {
                let mut built = VirtualLight::new(light.parsed_entity_id()?, light.capabilities(), at)
                    .with_state(light.on);
                if let Some(brightness) = light.brightness {
                    built = built.with_brightness_pct(brightness);
                }
                Ok(built)
            })
            .collect()
    }
}

impl LightConfig {
    fn parsed_entity_id(&self) -> Result<EntityId, ConfigError> {
        Ok(self.entity_id.parse::<EntityId>()?)
    }

    fn capabilities(&self) -> LightCapabilities {
        LightCapabilities {
            color_temp: self.color_temp,
            rgb: self.rgb,
            ..LightCapabilities::dimmable()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            lighting: LightingConfig::default(),
            sun: SunConfig::default(),
            lights: vec![LightConfig {
                entity_id: "light.virtual_light".to_string(),
                color_temp: true,
                rgb: false,
                brightness: None,
                on: false,
            }],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "circadiad=info,circadia_app=info,circadia_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: settings::DEFAULT_INTERVAL.as_secs(),
            transition_secs: settings::DEFAULT_TRANSITION.as_secs_f64(),
            wind_down_target: "22:00".to_string(),
            wake_up: "06:30".to_string(),
            wind_down_minutes: settings::DEFAULT_WIND_DOWN_DURATION.as_secs() / 60,
            wake_up_minutes: settings::DEFAULT_WAKE_UP_DURATION.as_secs() / 60,
            sleep_brightness: settings::DEFAULT_SLEEP_BRIGHTNESS,
            max_brightness: settings::DEFAULT_MAX_BRIGHTNESS,
            sleep_color_temp: settings::DEFAULT_SLEEP_COLOR_TEMP,
            min_color_temp: settings::DEFAULT_MIN_COLOR_TEMP,
            max_color_temp: settings::DEFAULT_MAX_COLOR_TEMP,
            exclude: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration")]
    Validation(#[from] CircadiaError),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.into())
    }
}
