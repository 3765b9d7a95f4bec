//! The adaptive lighting controller.
//!
//! Two long-lived tasks drive the lights:
//! - a **tick loop** that periodically re-applies the current target to every
//!   discovered light that is on and not held;
//! - an **event loop** that reacts to state changes: a light turning on gets a
//!   tracked apply sequence, a light turning off loses its pending sequence,
//!   and an attribute change on a light that stays on is checked for a manual
//!   override.
//!
//! An apply sequence writes brightness, waits for the transition, re-reads the
//! light and writes color only if it is still on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use circadia_domain::color::color_temperature_to_rgb;
use circadia_domain::command::LightCommand;
use circadia_domain::entity::ColorMode;
use circadia_domain::error::CircadiaError;
use circadia_domain::event::{StateChangedEvent, Transition};
use circadia_domain::hold::{HoldDecision, HoldTracker};
use circadia_domain::id::{ControllerId, EntityId};
use circadia_domain::settings::Settings;
use circadia_domain::target::{Target, compute_target, phase_at};
use circadia_domain::time::Timestamp;

use crate::discovery::discover_targets;
use crate::ports::{Clock, EventSubscriber, LightCommander, LightRegistry, SunPosition};

/// A tracked apply sequence started by a turn-on.
struct PendingSequence {
    sequence: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Tasks {
    tick: Option<JoinHandle<()>>,
    events: Option<JoinHandle<()>>,
}

struct Inner<C, S, R, L> {
    id: ControllerId,
    clock: C,
    sun: S,
    registry: R,
    commander: L,
    settings: RwLock<Arc<Settings>>,
    enabled: AtomicBool,
    holds: Mutex<HoldTracker>,
    pending: Mutex<HashMap<EntityId, PendingSequence>>,
    /// Untracked sequences started by ticks; they outlive a timer restart.
    tick_sequences: Mutex<JoinSet<()>>,
    next_sequence: AtomicU64,
}

/// Steers lights toward the time-of-day target while respecting manual holds.
///
/// Created stopped; call [`start`](Self::start) to install the tick and the
/// event subscription. Dropping the controller aborts every task it owns.
pub struct AdaptiveController<C, S, R, L, E> {
    inner: Arc<Inner<C, S, R, L>>,
    events: E,
    tasks: Mutex<Tasks>,
}

impl<C, S, R, L> Inner<C, S, R, L> {
    fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn holds(&self) -> MutexGuard<'_, HoldTracker> {
        self.holds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<EntityId, PendingSequence>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick_sequences(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tick_sequences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn abort_all_pending(&self) -> Vec<JoinHandle<()>> {
        self.pending()
            .drain()
            .map(|(_, pending)| {
                pending.handle.abort();
                pending.handle
            })
            .collect()
    }

    /// Drop the pending entry for `entity_id` if it still belongs to `sequence`.
    fn finish_pending(&self, entity_id: &EntityId, sequence: u64) {
        let mut pending = self.pending();
        if pending
            .get(entity_id)
            .is_some_and(|current| current.sequence == sequence)
        {
            pending.remove(entity_id);
        }
    }
}

impl<C, S, R, L> Inner<C, S, R, L>
where
    C: Clock + 'static,
    S: SunPosition + 'static,
    R: LightRegistry + 'static,
    L: LightCommander + 'static,
{
    fn current_target(&self, settings: &Settings) -> Target {
        let now = self.clock.local_time();
        let elevation = self.sun.elevation_degrees();
        let target = compute_target(now, elevation, settings);
        tracing::debug!(
            time = %now,
            elevation = ?elevation,
            phase = %phase_at(now, settings),
            brightness = target.brightness_pct,
            color_temp = target.color_temp_kelvin,
            "computed target"
        );
        target
    }

    async fn tick_loop(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    async fn tick(self: &Arc<Self>) {
        if !self.is_enabled() {
            tracing::debug!("controller disabled, skipping tick");
            return;
        }
        let settings = self.settings();
        let lights = discover_targets(&self.registry, &settings).await;
        if lights.is_empty() {
            return;
        }
        let target = self.current_target(&settings);
        let mut sequences = self.tick_sequences();
        while sequences.try_join_next().is_some() {}
        for (entity_id, light) in lights {
            if !light.is_on {
                continue;
            }
            if self.holds().is_held(&entity_id) {
                tracing::debug!(entity_id = %entity_id, "light held, skipping");
                continue;
            }
            let inner = Arc::clone(self);
            let transition = settings.transition;
            sequences.spawn(
                async move {
                    inner
                        .apply(entity_id, target, light.mode, transition)
                        .await;
                }
                .in_current_span(),
            );
        }
    }

    async fn event_loop(self: Arc<Self>, mut receiver: broadcast::Receiver<StateChangedEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state change subscription lagged");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("state change stream closed");
                    break;
                }
            }
        }
    }

    async fn handle_event(self: &Arc<Self>, event: StateChangedEvent) {
        if !self.is_enabled() || !event.entity_id.is_light() {
            return;
        }
        let transition = event.transition();
        if matches!(transition, Transition::Removed | Transition::Other) {
            return;
        }
        let settings = self.settings();
        let lights = discover_targets(&self.registry, &settings).await;
        let Some(light) = lights.get(&event.entity_id).copied() else {
            return;
        };

        match transition {
            Transition::TurnedOff => {
                if let Some(previous) = self.pending().remove(&event.entity_id) {
                    previous.handle.abort();
                    tracing::debug!(entity_id = %event.entity_id, "light turned off, sequence cancelled");
                }
            }
            Transition::TurnedOn => {
                self.on_turned_on(event.entity_id, light.mode, &settings)
                    .await;
            }
            Transition::StayedOn => self.on_stayed_on(&event),
            Transition::Removed | Transition::Other => {}
        }
    }

    async fn on_turned_on(self: &Arc<Self>, entity_id: EntityId, mode: ColorMode, settings: &Settings) {
        if self.holds().release(&entity_id) {
            tracing::info!(entity_id = %entity_id, "light turned on, manual hold released");
        }

        let previous = self.pending().remove(&entity_id);
        if let Some(previous) = previous {
            previous.handle.abort();
            let _ = previous.handle.await;
        }

        let target = self.current_target(settings);
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(self);
        let transition = settings.transition;
        let key = entity_id.clone();

        let mut pending = self.pending();
        let handle = tokio::spawn(
            async move {
                inner
                    .apply(entity_id.clone(), target, mode, transition)
                    .await;
                inner.finish_pending(&entity_id, sequence);
            }
            .in_current_span(),
        );
        pending.insert(key, PendingSequence { sequence, handle });
    }

    fn on_stayed_on(&self, event: &StateChangedEvent) {
        let (Some(old), Some(new)) = (&event.old_state, &event.new_state) else {
            return;
        };
        let decision = self.holds().observe_change(
            &event.entity_id,
            &old.attributes,
            &new.attributes,
            new.last_changed,
        );
        match decision {
            HoldDecision::NewlyHeld => {
                tracing::info!(entity_id = %event.entity_id, "manual change detected, holding light");
            }
            HoldDecision::Automation => {
                tracing::trace!(entity_id = %event.entity_id, "change attributed to automation");
            }
            HoldDecision::Unchanged | HoldDecision::StillHeld => {}
        }
    }

    /// Brightness, pause, re-check, color.
    async fn apply(&self, entity_id: EntityId, target: Target, mode: ColorMode, transition: Duration) {
        self.holds()
            .record_automation_write(&entity_id, self.clock.now());
        let brightness =
            LightCommand::brightness(entity_id.clone(), target.brightness_pct, transition);
        if let Err(err) = self.commander.turn_on(brightness).await {
            tracing::warn!(%err, entity_id = %entity_id, "brightness write failed");
        }

        tokio::time::sleep(transition).await;

        match self.registry.state(&entity_id).await {
            Ok(Some(snapshot)) if snapshot.is_on() => {}
            Ok(_) => {
                tracing::debug!(entity_id = %entity_id, "light no longer on, skipping color write");
                return;
            }
            Err(err) => {
                tracing::warn!(%err, entity_id = %entity_id, "light state lookup failed");
                return;
            }
        }

        let kelvin = target.color_temp_kelvin;
        let color = match mode {
            ColorMode::ColorTemperature => {
                LightCommand::color_temperature(entity_id.clone(), kelvin, transition)
            }
            ColorMode::Rgb => LightCommand::rgb(
                entity_id.clone(),
                color_temperature_to_rgb(u32::from(kelvin)),
                transition,
            ),
        };
        self.holds()
            .record_automation_write(&entity_id, self.clock.now());
        if let Err(err) = self.commander.turn_on(color).await {
            tracing::warn!(%err, entity_id = %entity_id, "color write failed");
        }

        self.holds()
            .record_automation_change(&entity_id, self.clock.now());
        tracing::debug!(
            entity_id = %entity_id,
            brightness = target.brightness_pct,
            color_temp = kelvin,
            mode = %mode,
            "target applied"
        );
    }
}

impl<C, S, R, L, E> AdaptiveController<C, S, R, L, E> {
    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identifier of this activation, used as the tracing span field.
    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.inner.id
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    /// Turn automation on or off. Sequences already running finish.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.inner.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(controller = %self.inner.id, enabled, "adaptive lighting toggled");
        }
    }

    /// The active settings.
    #[must_use]
    pub fn settings(&self) -> Arc<Settings> {
        self.inner.settings()
    }

    #[must_use]
    pub fn is_held(&self, entity_id: &EntityId) -> bool {
        self.inner.holds().is_held(entity_id)
    }

    /// When the controller last completed an apply sequence on `entity_id`.
    #[must_use]
    pub fn last_automation_change(&self, entity_id: &EntityId) -> Option<Timestamp> {
        self.inner.holds().last_automation_change(entity_id)
    }

    /// Whether a turn-on sequence is in flight for `entity_id`.
    #[must_use]
    pub fn has_pending(&self, entity_id: &EntityId) -> bool {
        self.inner.pending().contains_key(entity_id)
    }

    /// Whether the tick or the event subscription is installed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        let tasks = self.tasks();
        [&tasks.tick, &tasks.events]
            .into_iter()
            .flatten()
            .any(|handle| !handle.is_finished())
    }

    /// Tear down the tick, the subscription and every pending sequence, and
    /// forget all per-light state. Calling it again is a no-op.
    pub async fn stop(&self) {
        let (tick, events) = {
            let mut tasks = self.tasks();
            (tasks.tick.take(), tasks.events.take())
        };
        let mut handles: Vec<JoinHandle<()>> = tick.into_iter().chain(events).collect();
        handles.extend(self.inner.abort_all_pending());
        if handles.is_empty() {
            return;
        }
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            let _ = handle.await;
        }
        let mut tick_sequences = std::mem::take(&mut *self.inner.tick_sequences());
        tick_sequences.shutdown().await;
        self.inner.holds().clear();
        tracing::info!(controller = %self.inner.id, "adaptive lighting stopped");
    }
}

impl<C, S, R, L, E> AdaptiveController<C, S, R, L, E>
where
    C: Clock + 'static,
    S: SunPosition + 'static,
    R: LightRegistry + 'static,
    L: LightCommander + 'static,
    E: EventSubscriber,
{
    /// Build a stopped, enabled controller.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::Validation`] when `settings` break an invariant.
    pub fn new(
        clock: C,
        sun: S,
        registry: R,
        commander: L,
        events: E,
        settings: Settings,
    ) -> Result<Self, CircadiaError> {
        settings.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                id: ControllerId::new(),
                clock,
                sun,
                registry,
                commander,
                settings: RwLock::new(Arc::new(settings)),
                enabled: AtomicBool::new(true),
                holds: Mutex::new(HoldTracker::default()),
                pending: Mutex::new(HashMap::new()),
                tick_sequences: Mutex::new(JoinSet::new()),
                next_sequence: AtomicU64::new(0),
            }),
            events,
            tasks: Mutex::new(Tasks::default()),
        })
    }

    fn span(&self) -> tracing::Span {
        tracing::info_span!("controller", id = %self.inner.id)
    }

    fn spawn_tick(&self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(
            Arc::clone(&self.inner)
                .tick_loop(period)
                .instrument(self.span()),
        )
    }

    /// Install the tick and the state-change subscription, stopping any
    /// previous activation first.
    pub async fn start(&self) {
        self.stop().await;
        let settings = self.inner.settings();
        // subscribe before returning so no change published afterwards is missed
        let receiver = self.events.subscribe();
        let events = tokio::spawn(
            Arc::clone(&self.inner)
                .event_loop(receiver)
                .instrument(self.span()),
        );
        let tick = self.spawn_tick(settings.interval);

        let mut tasks = self.tasks();
        tasks.tick = Some(tick);
        tasks.events = Some(events);
        tracing::info!(
            controller = %self.inner.id,
            interval_secs = settings.interval.as_secs_f64(),
            "adaptive lighting started"
        );
    }

    /// Replace the settings. Holds and automation timestamps are kept; the
    /// tick restarts only when the interval changed, and sequences already
    /// started by earlier ticks run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`CircadiaError::Validation`] when `settings` break an
    /// invariant; the active settings are left untouched.
    pub async fn update_settings(&self, settings: Settings) -> Result<(), CircadiaError> {
        settings.validate()?;
        let interval = settings.interval;
        let previous = std::mem::replace(
            &mut *self
                .inner
                .settings
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            Arc::new(settings),
        );
        tracing::info!(controller = %self.inner.id, "settings updated");
        if previous.interval == interval {
            return Ok(());
        }

        let old_tick = self.tasks().tick.take();
        let Some(old_tick) = old_tick else {
            return Ok(());
        };
        old_tick.abort();
        let _ = old_tick.await;
        let tick = self.spawn_tick(interval);
        self.tasks().tick = Some(tick);
        tracing::debug!(interval_secs = interval.as_secs_f64(), "tick restarted");
        Ok(())
    }
}

impl<C, S, R, L, E> Drop for AdaptiveController<C, S, R, L, E> {
    fn drop(&mut self) {
        let tasks = std::mem::take(&mut *self.tasks());
        for handle in tasks.tick.into_iter().chain(tasks.events) {
            handle.abort();
        }
        self.inner.abort_all_pending();
        self.inner.tick_sequences().abort_all();
    }
}
