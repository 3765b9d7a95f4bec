//! # circadia-adapter-virtual
//!
//! Virtual/demo adapter that simulates a set of lights and a sun that never
//! moves, for testing and demonstration purposes.
//!
//! [`VirtualLights`] implements both the registry and the command port, and
//! publishes a [`StateChangedEvent`] for every change, whether it came from
//! the controller or from one of the "manual" methods that stand in for a
//! user at a wall switch.
//!
//! ## Dependency rule
//!
//! Depends on `circadia-app` (port traits) and `circadia-domain` only.

mod light;
mod sun;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use circadia_app::ports::{Clock, EventPublisher, LightCommander, LightRegistry};
use circadia_domain::command::LightCommand;
use circadia_domain::entity::LightSnapshot;
use circadia_domain::error::{CircadiaError, NotFoundError};
use circadia_domain::event::StateChangedEvent;
use circadia_domain::id::EntityId;
use circadia_domain::time::Timestamp;

pub use light::VirtualLight;
pub use sun::FixedSun;

/// A set of simulated lights.
pub struct VirtualLights<P, C> {
    lights: Mutex<BTreeMap<EntityId, VirtualLight>>,
    publisher: P,
    clock: C,
}

impl<P, C> VirtualLights<P, C>
where
    P: EventPublisher,
    C: Clock,
{
    #[must_use]
    pub fn new(publisher: P, clock: C) -> Self {
        Self {
            lights: Mutex::new(BTreeMap::new()),
            publisher,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<EntityId, VirtualLight>> {
        self.lights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current time, for stamping lights built outside this adapter.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Register a light without publishing anything.
    pub fn add(&self, light: VirtualLight) {
        tracing::debug!(entity_id = %light.entity_id(), "virtual light added");
        self.lock().insert(light.entity_id().clone(), light);
    }

    /// Ids of every registered light.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn snapshot(&self, entity_id: &EntityId) -> Option<LightSnapshot> {
        self.lock()
            .get(entity_id)
            .map(|light| light.snapshot().clone())
    }

    /// Run `change` against one light and publish the result if it differs.
    async fn mutate<F>(&self, entity_id: &EntityId, change: F) -> Result<(), CircadiaError>
    where
        F: FnOnce(&mut VirtualLight, Timestamp),
    {
        let now = self.clock.now();
        let (old, new) = {
            let mut lights = self.lock();
            let light = lights.get_mut(entity_id).ok_or_else(|| NotFoundError {
                entity: "Light",
                id: entity_id.to_string(),
            })?;
            let old = light.snapshot().clone();
            change(light, now);
            (old, light.snapshot().clone())
        };
        if old == new {
            return Ok(());
        }
        tracing::trace!(entity_id = %entity_id, state = %new.state, "virtual light changed");
        self.publisher
            .publish(StateChangedEvent {
                entity_id: entity_id.clone(),
                old_state: Some(old),
                new_state: Some(new),
            })
            .await
    }

    /// Flip a light on as a user would.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::NotFound`] for an unknown light.
    pub async fn switch_on(&self, entity_id: &EntityId) -> Result<(), CircadiaError> {
        self.mutate(entity_id, VirtualLight::turn_on).await
    }

    /// Flip a light off as a user would.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::NotFound`] for an unknown light.
    pub async fn switch_off(&self, entity_id: &EntityId) -> Result<(), CircadiaError> {
        self.mutate(entity_id, VirtualLight::turn_off).await
    }

    /// Dim a light by hand.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::NotFound`] for an unknown light.
    pub async fn dim(&self, entity_id: &EntityId, pct: u8) -> Result<(), CircadiaError> {
        self.mutate(entity_id, |light, at| light.set_brightness_pct(pct, at))
            .await
    }

    /// Unregister a light and announce its removal.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::NotFound`] for an unknown light.
    pub async fn remove(&self, entity_id: &EntityId) -> Result<(), CircadiaError> {
        let removed = self.lock().remove(entity_id).ok_or_else(|| NotFoundError {
            entity: "Light",
            id: entity_id.to_string(),
        })?;
        self.publisher
            .publish(StateChangedEvent {
                entity_id: entity_id.clone(),
                old_state: Some(removed.snapshot().clone()),
                new_state: None,
            })
            .await
    }
}

impl<P, C> LightRegistry for VirtualLights<P, C>
where
    P: EventPublisher,
    C: Clock,
{
    async fn discover(
        &self,
        exclude: &BTreeSet<EntityId>,
    ) -> Result<Vec<LightSnapshot>, CircadiaError> {
        Ok(self
            .lock()
            .values()
            .filter(|light| !exclude.contains(light.entity_id()))
            .map(|light| light.snapshot().clone())
            .collect())
    }

    async fn state(&self, entity_id: &EntityId) -> Result<Option<LightSnapshot>, CircadiaError> {
        Ok(self.snapshot(entity_id))
    }
}

impl<P, C> LightCommander for VirtualLights<P, C>
where
    P: EventPublisher,
    C: Clock,
{
    async fn turn_on(&self, command: LightCommand) -> Result<(), CircadiaError> {
        let entity_id = command.entity_id.clone();
        self.mutate(&entity_id, |light, at| light.apply(&command, at))
            .await
    }
}
