//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`CircadiaError`] via `#[from]`.

/// Top-level error type crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum CircadiaError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Failure reported by an external collaborator (registry, command sink, …).
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tick interval must be non-zero")]
    ZeroInterval,

    #[error("brightness {0}% is outside 0..=100")]
    BrightnessOutOfRange(u8),

    #[error("sleep brightness {sleep}% exceeds day brightness {day}%")]
    SleepBrighterThanDay { sleep: u8, day: u8 },

    #[error("color temperature bounds are inverted ({min}K > {max}K)")]
    InvertedColorTemperatureBounds { min: u16, max: u16 },

    #[error("color temperature must be non-zero")]
    ZeroColorTemperature,

    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("invalid entity id {0:?}, expected <domain>.<object_id>")]
    InvalidEntityId(String),

    #[error("invalid duration {0}, expected a finite number of seconds >= 0")]
    InvalidDuration(String),
}

/// A lookup that found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
