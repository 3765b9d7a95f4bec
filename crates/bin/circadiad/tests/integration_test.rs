//! End-to-end tests for the full circadiad stack.
//!
//! Each test wires the real event bus, the virtual lights and the controller
//! together and drives them with tokio's paused clock, playing the part of a
//! user at the wall switch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};

use circadia_adapter_virtual::{FixedSun, VirtualLight, VirtualLights};
use circadia_app::controller::AdaptiveController;
use circadia_app::event_bus::InProcessEventBus;
use circadia_app::ports::Clock;
use circadia_domain::entity::LightCapabilities;
use circadia_domain::id::EntityId;
use circadia_domain::settings::Settings;
use circadia_domain::time::Timestamp;

/// Wall clock pinned to noon whose absolute time follows tokio's clock.
struct PausedClock {
    started: tokio::time::Instant,
}

impl Clock for PausedClock {
    fn now(&self) -> Timestamp {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap();
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + elapsed
    }

    fn local_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }
}

type Lights = VirtualLights<Arc<InProcessEventBus>, Arc<PausedClock>>;

struct Stack {
    lights: Arc<Lights>,
    controller: AdaptiveController<
        Arc<PausedClock>,
        FixedSun,
        Arc<Lights>,
        Arc<Lights>,
        Arc<InProcessEventBus>,
    >,
}

fn desk() -> EntityId {
    "light.desk".parse().unwrap()
}

async fn stack() -> Stack {
    let clock = Arc::new(PausedClock {
        started: tokio::time::Instant::now(),
    });
    let bus = Arc::new(InProcessEventBus::new(64));
    let lights = Arc::new(VirtualLights::new(Arc::clone(&bus), Arc::clone(&clock)));
    lights.add(VirtualLight::new(
        desk(),
        LightCapabilities::color_temp(),
        lights.now(),
    ));
    let controller = AdaptiveController::new(
        clock,
        FixedSun::new(Some(60.0)),
        Arc::clone(&lights),
        Arc::clone(&lights),
        bus,
        Settings::default(),
    )
    .unwrap();
    controller.start().await;
    Stack { lights, controller }
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn should_adapt_light_when_switched_on() {
    let stack = stack().await;

    stack.lights.switch_on(&desk()).await.unwrap();
    advance(3).await;

    let snapshot = stack.lights.snapshot(&desk()).unwrap();
    assert!(snapshot.is_on());
    assert_eq!(snapshot.attributes.brightness, Some(255));
    assert_eq!(snapshot.attributes.color_temp_kelvin, Some(6500));
    assert!(!stack.controller.is_held(&desk()));
}

#[tokio::test(start_paused = true)]
async fn should_hold_light_after_manual_dim_until_switched_off_and_on() {
    let stack = stack().await;
    stack.lights.switch_on(&desk()).await.unwrap();
    advance(10).await;

    stack.lights.dim(&desk(), 20).await.unwrap();
    advance(1).await;
    assert!(stack.controller.is_held(&desk()));

    advance(130).await;
    let snapshot = stack.lights.snapshot(&desk()).unwrap();
    assert_eq!(snapshot.attributes.brightness, Some(51));

    stack.lights.switch_off(&desk()).await.unwrap();
    stack.lights.switch_on(&desk()).await.unwrap();
    advance(3).await;

    assert!(!stack.controller.is_held(&desk()));
    let snapshot = stack.lights.snapshot(&desk()).unwrap();
    assert_eq!(snapshot.attributes.brightness, Some(255));
}

#[tokio::test(start_paused = true)]
async fn should_not_write_color_when_switched_off_mid_sequence() {
    let stack = stack().await;

    stack.lights.switch_on(&desk()).await.unwrap();
    advance(1).await;
    stack.lights.switch_off(&desk()).await.unwrap();
    advance(3).await;

    let snapshot = stack.lights.snapshot(&desk()).unwrap();
    assert!(!snapshot.is_on());
    assert_eq!(snapshot.attributes.brightness, Some(255));
    assert_eq!(snapshot.attributes.color_temp_kelvin, None);
    assert_eq!(stack.controller.last_automation_change(&desk()), None);
}

#[tokio::test(start_paused = true)]
async fn should_correct_drift_on_tick() {
    let stack = stack().await;
    stack.lights.add(
        VirtualLight::new(
            "light.hall".parse().unwrap(),
            LightCapabilities::color_temp(),
            stack.lights.now(),
        )
        .with_state(true),
    );

    advance(123).await;

    let snapshot = stack.lights.snapshot(&"light.hall".parse().unwrap()).unwrap();
    assert_eq!(snapshot.attributes.brightness, Some(255));
    assert_eq!(snapshot.attributes.color_temp_kelvin, Some(6500));
}

#[tokio::test(start_paused = true)]
async fn should_leave_lights_alone_after_stop() {
    let stack = stack().await;
    stack.controller.stop().await;

    stack.lights.switch_on(&desk()).await.unwrap();
    advance(130).await;

    let snapshot = stack.lights.snapshot(&desk()).unwrap();
    assert_eq!(snapshot.attributes.brightness, None);
    assert!(!stack.controller.is_running());
}
