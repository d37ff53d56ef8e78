//! Trigger engine — evaluates facts against the trigger collection and fires
//! matched triggers.
//!
//! Every fact (device push, weather push, clock tick, heartbeat) goes through
//! the same pass: evaluate each trigger, apply the result to the dedup
//! tracker, and fire the triggers whose transition says so. Firings run
//! concurrently, one task each; within a firing the action completes before
//! the notification is attempted.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;

use trygr_domain::error::TrygrError;
use trygr_domain::event::Event;
use trygr_domain::fact::{ClockTick, EvaluationFact};
use trygr_domain::id::{DeviceId, TriggerKey};
use trygr_domain::location::Location;
use trygr_domain::time::{Timestamp, now};
use trygr_domain::trigger::{Evaluation, Trigger, TriggerType};
use trygr_domain::value::Value;

use crate::action_dispatcher::{ActionDispatcher, DispatchOutcome};
use crate::notification::{NotificationFanout, NotificationStatus};
use crate::ports::{DeviceCapability, DeviceStore, Notifier};
use crate::state_tracker::{Observation, StateTracker, Transition};

/// Engine policy knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Notify recipients when the primary action was a no-op.
    pub notify_on_noop: bool,
    /// Scheduler tick granularity; the span the first tick looks back over.
    pub tick_window: Duration,
    /// UTC offset for clock ticks until a location is known.
    pub default_utc_offset: FixedOffset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            notify_on_noop: false,
            tick_window: Duration::from_secs(60),
            default_utc_offset: Utc.fix(),
        }
    }
}

struct Loaded {
    triggers: Arc<[Trigger]>,
    keys: HashSet<TriggerKey>,
    loaded_at: Timestamp,
}

impl Loaded {
    fn new(triggers: Vec<Trigger>) -> Self {
        Self {
            keys: triggers.iter().map(Trigger::key).collect(),
            triggers: triggers.into(),
            loaded_at: now(),
        }
    }
}

/// The shared, refreshable trigger collection and its dedup state.
///
/// A pass works on the snapshot it took when it started; [`replace`](Self::replace)
/// only affects later passes.
pub struct TriggerSet {
    loaded: RwLock<Loaded>,
    tracker: StateTracker,
}

impl TriggerSet {
    /// Create a set from already validated triggers.
    #[must_use]
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self {
            loaded: RwLock::new(Loaded::new(triggers)),
            tracker: StateTracker::new(),
        }
    }

    /// Validate and load a collection.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] for the first invalid trigger.
    pub fn load(triggers: Vec<Trigger>) -> Result<Self, TrygrError> {
        triggers.iter().try_for_each(Trigger::validate)?;
        Ok(Self::new(triggers))
    }

    /// The current collection and the instant it was loaded.
    #[must_use]
    pub fn snapshot(&self) -> (Arc<[Trigger]>, Timestamp) {
        let loaded = self.loaded.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&loaded.triggers), loaded.loaded_at)
    }

    /// Atomically swap the collection, forgetting the dedup state of
    /// triggers that are no longer present.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] for the first invalid trigger; the
    /// current collection is then left untouched.
    #[tracing::instrument(skip_all, fields(count = triggers.len()))]
    pub fn replace(&self, triggers: Vec<Trigger>) -> Result<(), TrygrError> {
        triggers.iter().try_for_each(Trigger::validate)?;
        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        *loaded = Loaded::new(triggers);
        self.tracker.retain(&loaded.keys);
        drop(loaded);
        tracing::info!("trigger collection replaced");
        Ok(())
    }

    /// Apply an observation to a trigger's dedup state.
    ///
    /// A trigger removed since the caller took its snapshot is not tracked
    /// and yields [`Transition::Idle`].
    pub fn observe(&self, key: TriggerKey, observation: Observation, at: Timestamp) -> Transition {
        let loaded = self.loaded.read().unwrap_or_else(PoisonError::into_inner);
        if !loaded.keys.contains(&key) {
            return Transition::Idle;
        }
        self.tracker.observe(key, observation, at)
    }

    /// The dedup tracker of this collection.
    #[must_use]
    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }
}

/// One fired trigger and what came of it.
#[derive(Debug)]
pub struct Firing {
    pub key: TriggerKey,
    pub trigger: Trigger,
    pub outcome: DispatchOutcome,
    pub notification: NotificationStatus,
}

/// Everything a pass fired, in completion order.
#[derive(Debug, Default)]
pub struct PassReport {
    pub fired: Vec<Firing>,
}

impl PassReport {
    /// Append another pass's firings.
    pub fn merge(&mut self, other: Self) {
        self.fired.extend(other.fired);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Orchestrates evaluator, tracker, dispatcher and notification fanout.
pub struct TriggerEngine<DS, N, C> {
    triggers: Arc<TriggerSet>,
    dispatcher: ActionDispatcher<DS, C>,
    fanout: NotificationFanout<N>,
    config: EngineConfig,
    last_location: RwLock<Option<Location>>,
    last_tick: Mutex<Option<Timestamp>>,
}

impl<DS, N, C> TriggerEngine<DS, N, C>
where
    DS: DeviceStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    C: DeviceCapability + 'static,
{
    pub fn new(
        triggers: Arc<TriggerSet>,
        dispatcher: ActionDispatcher<DS, C>,
        fanout: NotificationFanout<N>,
        config: EngineConfig,
    ) -> Self {
        Self {
            triggers,
            dispatcher,
            fanout,
            config,
            last_location: RwLock::new(None),
            last_tick: Mutex::new(None),
        }
    }

    /// The trigger collection this engine evaluates.
    pub fn triggers(&self) -> &Arc<TriggerSet> {
        &self.triggers
    }

    /// Remember a location for sun times, UTC offset and weather heartbeats.
    pub fn remember_location(&self, location: Location) {
        *self
            .last_location
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(location);
    }

    /// The last location seen through a push or a scheduler refresh.
    pub fn last_location(&self) -> Option<Location> {
        self.last_location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one evaluation pass for a fact and wait for its firings.
    ///
    /// Errors are isolated per trigger: a malformed trigger is treated as
    /// not matching, a failed dispatch or notification is logged and
    /// reported, and sibling triggers are evaluated regardless.
    #[tracing::instrument(skip_all, fields(fact = fact.kind()))]
    pub async fn evaluate(self: &Arc<Self>, fact: EvaluationFact) -> PassReport {
        if let EvaluationFact::Weather(location) = &fact {
            self.remember_location(location.clone());
        }
        let (triggers, _) = self.triggers.snapshot();
        let at = now();
        let mut firings = JoinSet::new();

        for trigger in triggers.iter() {
            let key = trigger.key();
            let (observation, action_value) = match trigger.evaluate(&fact) {
                Ok(Evaluation::Irrelevant) => continue,
                Ok(Evaluation::NoMatch) => (Observation::Cleared, None),
                Ok(Evaluation::Matched {
                    action_value,
                    occurrence,
                }) => (Observation::Matched(occurrence), Some(action_value)),
                Err(err) => {
                    tracing::warn!(%err, trigger = %key, "malformed trigger treated as non-matching");
                    (Observation::Cleared, None)
                }
            };
            match self.triggers.observe(key, observation, at) {
                Transition::Fire => {
                    let engine = Arc::clone(self);
                    let trigger = trigger.clone();
                    let action_value = action_value.unwrap_or_else(|| trigger.action_value.clone());
                    firings.spawn(async move { engine.fire(key, trigger, action_value).await });
                }
                Transition::Rearm => tracing::debug!(trigger = %key, "trigger re-armed"),
                Transition::Hold | Transition::Idle => {}
            }
        }

        let mut report = PassReport::default();
        while let Some(joined) = firings.join_next().await {
            match joined {
                Ok(firing) => report.fired.push(firing),
                Err(err) => tracing::warn!(%err, "firing task did not complete"),
            }
        }
        report
    }

    /// Evaluate scheduled triggers against a clock tick at `at`.
    ///
    /// The tick covers everything since the previous one, so a tick that
    /// arrives late still catches targets that fell in between.
    pub async fn run_tick(self: &Arc<Self>, at: Timestamp) -> PassReport {
        let (_, loaded_at) = self.triggers.snapshot();
        let previous = self
            .last_tick
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(at);
        let mut tick = ClockTick::new(at, self.config.tick_window, loaded_at)
            .with_utc_offset(self.config.default_utc_offset);
        if let Some(previous) = previous {
            tick = tick.after(previous);
        }
        let tick = match self.last_location() {
            Some(location) => tick.with_location(&location),
            None => tick,
        };
        self.evaluate(EvaluationFact::Tick(tick)).await
    }

    /// Re-offer the current device and weather state to level triggers, in
    /// case a push was missed. Armed triggers stay quiet.
    pub async fn heartbeat(self: &Arc<Self>) -> PassReport {
        let (triggers, _) = self.triggers.snapshot();
        let watched: HashSet<&DeviceId> = triggers
            .iter()
            .filter(|t| t.trigger_type == TriggerType::Device)
            .filter_map(|t| t.affected_device_id.as_ref())
            .collect();

        let mut report = PassReport::default();
        for device_id in watched {
            match self.dispatcher.devices().get_by_id(device_id).await {
                Ok(Some(device)) => {
                    report.merge(self.evaluate(EvaluationFact::Device(device)).await);
                }
                Ok(None) => {
                    tracing::warn!(device = %device_id, "watched device not found, skipping its triggers");
                }
                Err(err) => tracing::warn!(%err, device = %device_id, "failed to load watched device"),
            }
        }
        if let Some(location) = self.last_location() {
            report.merge(self.evaluate(EvaluationFact::Weather(location)).await);
        }
        report
    }

    /// Evaluate every event received from the bus until shutdown.
    ///
    /// Each event is evaluated in its own task so a slow action never holds
    /// up the next event. Outstanding evaluations are aborted on shutdown.
    pub async fn listen(
        self: Arc<Self>,
        mut events: broadcast::Receiver<Event>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut passes = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        tracing::debug!(%event, "evaluating event");
                        let engine = Arc::clone(&self);
                        passes.spawn(async move { engine.evaluate(event.into()).await });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "trigger engine lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                Some(_) = passes.join_next(), if !passes.is_empty() => {}
            }
        }
        passes.abort_all();
        tracing::info!("trigger engine stopped");
    }

    async fn fire(&self, key: TriggerKey, trigger: Trigger, action_value: Value) -> Firing {
        tracing::info!(trigger = %key, %trigger, "trigger fired");
        let outcome = self.dispatcher.dispatch(&trigger, &action_value).await;
        let notification = match self.message(&trigger, &outcome) {
            Ok(message) => self.fanout.notify(&trigger.notify, &message).await,
            Err(status) => status,
        };
        Firing {
            key,
            trigger,
            outcome,
            notification,
        }
    }

    fn message(
        &self,
        trigger: &Trigger,
        outcome: &DispatchOutcome,
    ) -> Result<String, NotificationStatus> {
        match outcome {
            DispatchOutcome::NotifyOnly => Ok(format!("Trigger fired: {trigger}")),
            DispatchOutcome::Completed { primary, .. }
                if primary.no_op && !self.config.notify_on_noop =>
            {
                Err(NotificationStatus::Suppressed)
            }
            DispatchOutcome::Completed { primary, .. } => Ok(primary.result_text.clone()),
            DispatchOutcome::Failed(err @ TrygrError::ActionFailed(_)) => {
                tracing::warn!(%err, %trigger, "action failed");
                Ok(format!("Action failed: {err}"))
            }
            DispatchOutcome::Failed(err) => {
                tracing::warn!(%err, %trigger, "trigger skipped");
                Err(NotificationStatus::NotApplicable)
            }
        }
    }
}
