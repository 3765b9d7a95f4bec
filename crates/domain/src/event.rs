//! State-change notifications delivered by the event stream.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityState, LightSnapshot};
use crate::id::EntityId;

/// A light changed state or attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChangedEvent {
    pub entity_id: EntityId,
    /// `None` when the entity just appeared.
    pub old_state: Option<LightSnapshot>,
    /// `None` when the entity was removed.
    pub new_state: Option<LightSnapshot>,
}

/// How a [`StateChangedEvent`] moved the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Was on, now off.
    TurnedOff,
    /// Was off, unknown or absent, now on.
    TurnedOn,
    /// On before and after; attributes may have changed.
    StayedOn,
    /// The entity disappeared.
    Removed,
    /// Anything else (off -> off, on -> unavailable, …).
    Other,
}

impl StateChangedEvent {
    /// Classify the change.
    #[must_use]
    pub fn transition(&self) -> Transition {
        let Some(new) = &self.new_state else {
            return Transition::Removed;
        };
        let was_on = self.old_state.as_ref().is_some_and(LightSnapshot::is_on);
        match (was_on, new.state) {
            (false, EntityState::On) => Transition::TurnedOn,
            (true, EntityState::On) => Transition::StayedOn,
            (true, EntityState::Off) => Transition::TurnedOff,
            _ => Transition::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LightAttributes, LightCapabilities};
    use crate::time::now;

    fn snapshot(state: EntityState) -> LightSnapshot {
        LightSnapshot {
            entity_id: "light.desk".parse().unwrap(),
            state,
            capabilities: LightCapabilities::color_temp(),
            attributes: LightAttributes::default(),
            last_changed: now(),
        }
    }

    fn event(old: Option<EntityState>, new: Option<EntityState>) -> StateChangedEvent {
        StateChangedEvent {
            entity_id: "light.desk".parse().unwrap(),
            old_state: old.map(snapshot),
            new_state: new.map(snapshot),
        }
    }

    #[test]
    fn should_classify_turn_on_from_off() {
        let ev = event(Some(EntityState::Off), Some(EntityState::On));
        assert_eq!(ev.transition(), Transition::TurnedOn);
    }

    #[test]
    fn should_classify_turn_on_from_absent() {
        let ev = event(None, Some(EntityState::On));
        assert_eq!(ev.transition(), Transition::TurnedOn);
    }

    #[test]
    fn should_classify_turn_off() {
        let ev = event(Some(EntityState::On), Some(EntityState::Off));
        assert_eq!(ev.transition(), Transition::TurnedOff);
    }

    #[test]
    fn should_classify_attribute_change_while_on() {
        let ev = event(Some(EntityState::On), Some(EntityState::On));
        assert_eq!(ev.transition(), Transition::StayedOn);
    }

    #[test]
    fn should_classify_removal() {
        let ev = event(Some(EntityState::On), None);
        assert_eq!(ev.transition(), Transition::Removed);
    }

    #[test]
    fn should_classify_on_to_unavailable_as_other() {
        let ev = event(Some(EntityState::On), Some(EntityState::Unavailable));
        assert_eq!(ev.transition(), Transition::Other);
    }

    #[test]
    fn should_classify_off_to_off_as_other() {
        let ev = event(Some(EntityState::Off), Some(EntityState::Off));
        assert_eq!(ev.transition(), Transition::Other);
    }
}
