//! Target discovery: which lights the controller drives, and how.

use std::collections::BTreeMap;

use circadia_domain::entity::ColorMode;
use circadia_domain::id::EntityId;
use circadia_domain::settings::Settings;

use crate::ports::LightRegistry;

/// A light eligible for adaptive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredLight {
    pub mode: ColorMode,
    pub is_on: bool,
}

/// Enumerate the lights the controller should drive.
///
/// Only `light.*` entities with brightness control and some form of color
/// control qualify; excluded ids are always dropped. A registry failure is
/// logged and yields an empty map, skipping the cycle.
pub async fn discover_targets<R: LightRegistry>(
    registry: &R,
    settings: &Settings,
) -> BTreeMap<EntityId, DiscoveredLight> {
    let snapshots = match registry.discover(&settings.exclude_entities).await {
        Ok(snapshots) => snapshots,
        Err(err) => {
            tracing::warn!(error = %err, "light discovery failed, skipping cycle");
            return BTreeMap::new();
        }
    };

    snapshots
        .into_iter()
        .filter(|snapshot| snapshot.entity_id.is_light())
        .filter(|snapshot| !settings.is_excluded(&snapshot.entity_id))
        .filter_map(|snapshot| {
            let mode = snapshot.capabilities.color_mode()?;
            let is_on = snapshot.is_on();
            Some((snapshot.entity_id, DiscoveredLight { mode, is_on }))
        })
        .collect()
}
