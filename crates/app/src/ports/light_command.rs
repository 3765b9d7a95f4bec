//! Light command port — issues `turn_on` writes.

use std::future::Future;

use circadia_domain::command::LightCommand;
use circadia_domain::error::CircadiaError;

/// Sends writes to lights.
///
/// Implementations must not wait for the device to confirm the new state;
/// the controller never retries a failed write.
pub trait LightCommander: Send + Sync {
    fn turn_on(&self, command: LightCommand)
    -> impl Future<Output = Result<(), CircadiaError>> + Send;
}

impl<T: LightCommander> LightCommander for std::sync::Arc<T> {
    fn turn_on(
        &self,
        command: LightCommand,
    ) -> impl Future<Output = Result<(), CircadiaError>> + Send {
        (**self).turn_on(command)
    }
}
