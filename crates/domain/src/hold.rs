//! Manual-hold tracking.
//!
//! Each light is either *free* (the controller may drive it) or *held* (a
//! user changed it, the controller leaves it alone until it is switched off
//! and on again). The only signal separating "the controller wrote this"
//! from "someone else wrote this" is timing: a change landing within
//! [`MANUAL_CHANGE_GRACE`] of the controller's last write is attributed to
//! the controller. Writes are tracked too: a device echoing a brightness
//! write arrives before the sequence finishes and must not count as manual.

use std::collections::HashMap;
use std::time::Duration;

use chrono::TimeDelta;

use crate::entity::LightAttributes;
use crate::id::EntityId;
use crate::time::Timestamp;

/// Window after an automation write during which changes are ours.
pub const MANUAL_CHANGE_GRACE: Duration = Duration::from_secs(1);

/// Per-light bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldEntry {
    pub manual_hold: bool,
    pub last_automation_change_at: Option<Timestamp>,
    pub last_automation_write_at: Option<Timestamp>,
}

/// Outcome of [`HoldTracker::observe_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldDecision {
    /// Brightness and color are unchanged; nothing to attribute.
    Unchanged,
    /// The change landed inside the grace window of our own write.
    Automation,
    /// The change is attributed to a user and the light was free until now.
    NewlyHeld,
    /// The change is attributed to a user; the light was already held.
    StillHeld,
}

/// Per-entity free/held state machine. Entries are created lazily.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    grace: TimeDelta,
    entries: HashMap<EntityId, HoldEntry>,
}

impl Default for HoldTracker {
    fn default() -> Self {
        Self::new(MANUAL_CHANGE_GRACE)
    }
}

impl HoldTracker {
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self {
            grace: TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX),
            entries: HashMap::new(),
        }
    }

    #[must_use]
    pub fn is_held(&self, entity_id: &EntityId) -> bool {
        self.entries
            .get(entity_id)
            .is_some_and(|entry| entry.manual_hold)
    }

    #[must_use]
    pub fn entry(&self, entity_id: &EntityId) -> Option<&HoldEntry> {
        self.entries.get(entity_id)
    }

    #[must_use]
    pub fn last_automation_change(&self, entity_id: &EntityId) -> Option<Timestamp> {
        self.entries
            .get(entity_id)
            .and_then(|entry| entry.last_automation_change_at)
    }

    /// Off -> on: drop any hold. Returns whether the light was held.
    pub fn release(&mut self, entity_id: &EntityId) -> bool {
        self.entries
            .get_mut(entity_id)
            .is_some_and(|entry| std::mem::replace(&mut entry.manual_hold, false))
    }

    /// Attribute an on -> on change observed at `changed_at`.
    pub fn observe_change(
        &mut self,
        entity_id: &EntityId,
        old: &LightAttributes,
        new: &LightAttributes,
        changed_at: Timestamp,
    ) -> HoldDecision {
        if !old.output_differs(new) {
            return HoldDecision::Unchanged;
        }
        let grace = self.grace;
        let entry = self.entries.entry(entity_id.clone()).or_default();
        let ours = [entry.last_automation_change_at, entry.last_automation_write_at]
            .into_iter()
            .flatten()
            .any(|last| {
                // a window reaching past the representable range never closes
                last.checked_add_signed(grace).is_none_or(|until| changed_at <= until)
            });
        if ours {
            return HoldDecision::Automation;
        }
        if std::mem::replace(&mut entry.manual_hold, true) {
            HoldDecision::StillHeld
        } else {
            HoldDecision::NewlyHeld
        }
    }

    /// Remember that the controller finished writing to `entity_id` at `at`.
    pub fn record_automation_change(&mut self, entity_id: &EntityId, at: Timestamp) {
        self.entries
            .entry(entity_id.clone())
            .or_default()
            .last_automation_change_at = Some(at);
    }

    /// Remember that the controller issued a write to `entity_id` at `at`.
    pub fn record_automation_write(&mut self, entity_id: &EntityId, at: Timestamp) {
        self.entries
            .entry(entity_id.clone())
            .or_default()
            .last_automation_write_at = Some(at);
    }

    /// Forget every entity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
