//! Light registry port — enumeration and state lookup of light entities.

use std::collections::BTreeSet;
use std::future::Future;

use circadia_domain::entity::LightSnapshot;
use circadia_domain::error::CircadiaError;
use circadia_domain::id::EntityId;

/// Read access to the lights known to the home.
pub trait LightRegistry: Send + Sync {
    /// Snapshot every light except the `exclude`d ones, on or off.
    fn discover(
        &self,
        exclude: &BTreeSet<EntityId>,
    ) -> impl Future<Output = Result<Vec<LightSnapshot>, CircadiaError>> + Send;

    /// Current snapshot of one light, `None` if it vanished.
    fn state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<LightSnapshot>, CircadiaError>> + Send;
}

impl<T: LightRegistry> LightRegistry for std::sync::Arc<T> {
    fn discover(
        &self,
        exclude: &BTreeSet<EntityId>,
    ) -> impl Future<Output = Result<Vec<LightSnapshot>, CircadiaError>> + Send {
        (**self).discover(exclude)
    }

    fn state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<LightSnapshot>, CircadiaError>> + Send {
        (**self).state(entity_id)
    }
}
