//! Virtual light — a single simulated device.

use circadia_domain::command::LightCommand;
use circadia_domain::entity::{EntityState, LightAttributes, LightCapabilities, LightSnapshot};
use circadia_domain::id::EntityId;
use circadia_domain::time::Timestamp;

/// A simulated light reporting its state as a [`LightSnapshot`].
#[derive(Debug, Clone)]
pub struct VirtualLight {
    snapshot: LightSnapshot,
}

/// Convert a 0..=100 percentage to the device's 0..=255 scale.
fn to_device_brightness(pct: u8) -> u8 {
    let scaled = (u16::from(pct.min(100)) * 255 + 50) / 100;
    u8::try_from(scaled).unwrap_or(u8::MAX)
}

impl VirtualLight {
    /// A light that is off and reports no attributes yet.
    #[must_use]
    pub fn new(entity_id: EntityId, capabilities: LightCapabilities, at: Timestamp) -> Self {
        Self {
            snapshot: LightSnapshot {
                entity_id,
                state: EntityState::Off,
                capabilities,
                attributes: LightAttributes::default(),
                last_changed: at,
            },
        }
    }

    #[must_use]
    pub fn with_state(mut self, on: bool) -> Self {
        self.snapshot.state = if on { EntityState::On } else { EntityState::Off };
        self
    }

    #[must_use]
    pub fn with_brightness_pct(mut self, pct: u8) -> Self {
        self.snapshot.attributes.brightness = Some(to_device_brightness(pct));
        self
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.snapshot.entity_id
    }

    #[must_use]
    pub fn snapshot(&self) -> &LightSnapshot {
        &self.snapshot
    }

    /// Apply a `turn_on` write: the light ends up on with the requested
    /// attributes. Color writes the light cannot honor are ignored.
    pub fn apply(&mut self, command: &LightCommand, at: Timestamp) {
        let caps = self.snapshot.capabilities;
        let mut attributes = self.snapshot.attributes;
        if let Some(pct) = command.brightness_pct.filter(|_| caps.brightness) {
            attributes.brightness = Some(to_device_brightness(pct));
        }
        if let Some(kelvin) = command.color_temp_kelvin.filter(|_| caps.color_temp) {
            attributes.color_temp_kelvin = Some(kelvin);
            attributes.rgb_color = None;
        }
        if let Some(rgb) = command.rgb_color.filter(|_| caps.rgb || caps.hs) {
            attributes.rgb_color = Some(rgb);
            attributes.color_temp_kelvin = None;
        }
        self.update(EntityState::On, attributes, at);
    }

    pub fn turn_on(&mut self, at: Timestamp) {
        self.update(EntityState::On, self.snapshot.attributes, at);
    }

    pub fn turn_off(&mut self, at: Timestamp) {
        self.update(EntityState::Off, self.snapshot.attributes, at);
    }

    /// Change brightness the way a wall dimmer would, without touching state.
    pub fn set_brightness_pct(&mut self, pct: u8, at: Timestamp) {
        let attributes = LightAttributes {
            brightness: Some(to_device_brightness(pct)),
            ..self.snapshot.attributes
        };
        self.update(self.snapshot.state, attributes, at);
    }

    fn update(&mut self, state: EntityState, attributes: LightAttributes, at: Timestamp) {
        if self.snapshot.state != state || self.snapshot.attributes != attributes {
            self.snapshot.state = state;
            self.snapshot.attributes = attributes;
            self.snapshot.last_changed = at;
        }
    }
}
