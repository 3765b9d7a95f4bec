//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use circadia_domain::error::CircadiaError;
use circadia_domain::event::StateChangedEvent;

use crate::ports::{EventPublisher, EventSubscriber};

/// In-process bus for [`StateChangedEvent`]s.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateChangedEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(
        &self,
        event: StateChangedEvent,
    ) -> impl Future<Output = Result<(), CircadiaError>> + Send {
        // send only fails without receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

impl EventSubscriber for InProcessEventBus {
    fn subscribe(&self) -> broadcast::Receiver<StateChangedEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use circadia_domain::entity::{EntityState, LightAttributes, LightCapabilities, LightSnapshot};
    use circadia_domain::id::EntityId;
    use circadia_domain::time::now;

    use super::*;

    fn turned_on(id: &str) -> StateChangedEvent {
        let entity_id: EntityId = id.parse().unwrap();
        StateChangedEvent {
            entity_id: entity_id.clone(),
            old_state: None,
            new_state: Some(LightSnapshot {
                entity_id,
                state: EntityState::On,
                capabilities: LightCapabilities::color_temp(),
                attributes: LightAttributes::default(),
                last_changed: now(),
            }),
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(turned_on("light.desk")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.entity_id.as_str(), "light.desk");
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        let event = turned_on("light.hall");
        bus.publish(event.clone()).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), event);
        assert_eq!(rx2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let result = bus.publish(turned_on("light.desk")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(turned_on("light.early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(turned_on("light.late")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.entity_id.as_str(), "light.late");
    }

    #[test]
    fn should_drop_subscription_with_receiver() {
        let bus = InProcessEventBus::new(4);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
