//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the controller and the outside world:
//! where time and the sun come from, how lights are enumerated and written,
//! and how state-change notifications arrive.

pub mod clock;
pub mod event_bus;
pub mod light_command;
pub mod light_registry;
pub mod sun;

pub use clock::Clock;
pub use event_bus::{EventPublisher, EventSubscriber};
pub use light_command::LightCommander;
pub use light_registry::LightRegistry;
pub use sun::SunPosition;
