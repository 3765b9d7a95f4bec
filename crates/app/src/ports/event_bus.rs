//! Event bus ports — publish/subscribe for state-change notifications.

use std::future::Future;

use tokio::sync::broadcast;

use circadia_domain::error::CircadiaError;
use circadia_domain::event::StateChangedEvent;

/// Publishes state changes to interested subscribers.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: StateChangedEvent,
    ) -> impl Future<Output = Result<(), CircadiaError>> + Send;
}

impl<T: EventPublisher> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: StateChangedEvent,
    ) -> impl Future<Output = Result<(), CircadiaError>> + Send {
        (**self).publish(event)
    }
}

/// Hands out subscriptions to state changes.
///
/// Dropping the returned receiver cancels the subscription.
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<StateChangedEvent>;
}

impl<T: EventSubscriber> EventSubscriber for std::sync::Arc<T> {
    fn subscribe(&self) -> broadcast::Receiver<StateChangedEvent> {
        (**self).subscribe()
    }
}
