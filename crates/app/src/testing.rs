//! In-memory fakes for the ports, shared by the unit tests of this crate.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};

use circadia_domain::command::LightCommand;
use circadia_domain::entity::{EntityState, LightAttributes, LightCapabilities, LightSnapshot};
use circadia_domain::error::CircadiaError;
use circadia_domain::id::EntityId;
use circadia_domain::time::Timestamp;

use crate::ports::{Clock, LightCommander, LightRegistry, SunPosition};

/// Clock whose absolute time follows tokio's (possibly paused) clock and
/// whose time of day is set by the test.
pub struct FakeClock {
    base: Timestamp,
    started: tokio::time::Instant,
    local: Mutex<NaiveTime>,
}

impl FakeClock {
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            base: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            started: tokio::time::Instant::now(),
            local: Mutex::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap()),
        }
    }

    pub fn set_local_time(&self, hour: u32, minute: u32) {
        *self.local.lock().unwrap_or_else(PoisonError::into_inner) =
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap();
        self.base + elapsed
    }

    fn local_time(&self) -> NaiveTime {
        *self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sun frozen at one elevation.
pub struct FixedSun(pub Option<f64>);

impl SunPosition for FixedSun {
    fn elevation_degrees(&self) -> Option<f64> {
        self.0
    }
}

/// Registry over a mutable map of snapshots.
#[derive(Default)]
pub struct InMemoryRegistry {
    lights: Mutex<BTreeMap<EntityId, LightSnapshot>>,
}

impl InMemoryRegistry {
    fn insert(&self, id: &str, state: EntityState, capabilities: LightCapabilities) {
        let entity_id: EntityId = id.parse().unwrap();
        let snapshot = LightSnapshot {
            entity_id: entity_id.clone(),
            state,
            capabilities,
            attributes: LightAttributes::default(),
            last_changed: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        self.lights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity_id, snapshot);
    }

    pub fn insert_on(&self, id: &str, capabilities: LightCapabilities) {
        self.insert(id, EntityState::On, capabilities);
    }

    pub fn insert_off(&self, id: &str, capabilities: LightCapabilities) {
        self.insert(id, EntityState::Off, capabilities);
    }

    pub fn set_state(&self, id: &EntityId, state: EntityState) {
        if let Some(snapshot) = self
            .lights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(id)
        {
            snapshot.state = state;
        }
    }

    pub fn snapshot(&self, id: &EntityId) -> LightSnapshot {
        self.lights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap()
    }
}

impl LightRegistry for InMemoryRegistry {
    async fn discover(
        &self,
        exclude: &BTreeSet<EntityId>,
    ) -> Result<Vec<LightSnapshot>, CircadiaError> {
        Ok(self
            .lights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|snapshot| !exclude.contains(&snapshot.entity_id))
            .cloned()
            .collect())
    }

    async fn state(&self, entity_id: &EntityId) -> Result<Option<LightSnapshot>, CircadiaError> {
        Ok(self
            .lights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_id)
            .cloned())
    }
}

/// Registry that always fails.
pub struct FailingRegistry;

impl LightRegistry for FailingRegistry {
    async fn discover(
        &self,
        _exclude: &BTreeSet<EntityId>,
    ) -> Result<Vec<LightSnapshot>, CircadiaError> {
        Err(CircadiaError::Integration("registry unavailable".into()))
    }

    async fn state(&self, _entity_id: &EntityId) -> Result<Option<LightSnapshot>, CircadiaError> {
        Err(CircadiaError::Integration("registry unavailable".into()))
    }
}

/// Commander recording every write, in order.
#[derive(Default)]
pub struct SpyCommander {
    commands: Mutex<Vec<LightCommand>>,
}

impl SpyCommander {
    pub fn commands(&self) -> Vec<LightCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn commands_for(&self, id: &EntityId) -> Vec<LightCommand> {
        self.commands()
            .into_iter()
            .filter(|command| &command.entity_id == id)
            .collect()
    }
}

impl LightCommander for SpyCommander {
    async fn turn_on(&self, command: LightCommand) -> Result<(), CircadiaError> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
        Ok(())
    }
}
