//! Dedup/state tracker — per-trigger memory behind edge firing.
//!
//! Level triggers (`device`, `minTemp`, `maxTemp`) fire when they go from
//! not matching to matching and stay quiet while the condition holds.
//! Scheduled triggers fire once per occurrence key.
//!
//! Each trigger has its own lock, so two facts evaluated concurrently for
//! the same trigger cannot both observe the pre-edge state. The lock only
//! covers the in-memory transition and is never held across an await.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use trygr_domain::id::TriggerKey;
use trygr_domain::time::Timestamp;
use trygr_domain::trigger::Occurrence;

/// What one evaluation said about a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Matched(Occurrence),
    Cleared,
}

/// What the engine should do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Rising edge or new occurrence: dispatch.
    Fire,
    /// Still matching, or an occurrence already fired.
    Hold,
    /// The level condition went false; the next match fires again.
    Rearm,
    /// Nothing changed.
    Idle,
}

/// Remembered state of one trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerState {
    pub armed: bool,
    pub last_occurrence: Option<i64>,
    pub last_fired: Option<Timestamp>,
}

impl TriggerState {
    fn apply(&mut self, observation: Observation, now: Timestamp) -> Transition {
        match observation {
            Observation::Matched(Occurrence::Level) if self.armed => Transition::Hold,
            Observation::Matched(Occurrence::Level) => {
                self.armed = true;
                self.last_fired = Some(now);
                Transition::Fire
            }
            Observation::Matched(Occurrence::Scheduled(key)) => {
                if self.last_occurrence == Some(key) {
                    return Transition::Hold;
                }
                self.last_occurrence = Some(key);
                self.last_fired = Some(now);
                Transition::Fire
            }
            Observation::Cleared if self.armed => {
                self.armed = false;
                Transition::Rearm
            }
            Observation::Cleared => Transition::Idle,
        }
    }
}

/// Process-local tracker; state is lost on restart.
#[derive(Debug, Default)]
pub struct StateTracker {
    states: RwLock<HashMap<TriggerKey, Arc<Mutex<TriggerState>>>>,
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an observation to a trigger's state and return the transition.
    pub fn observe(&self, key: TriggerKey, observation: Observation, now: Timestamp) -> Transition {
        let entry = self.entry(key);
        let mut state = entry.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply(observation, now)
    }

    /// Current state of a trigger, `None` when never observed.
    #[must_use]
    pub fn state(&self, key: TriggerKey) -> Option<TriggerState> {
        let states = self.states.read().unwrap_or_else(PoisonError::into_inner);
        states
            .get(&key)
            .map(|entry| entry.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    /// Forget every trigger not in `keys`.
    pub fn retain(&self, keys: &HashSet<TriggerKey>) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        states.retain(|key, _| keys.contains(key));
    }

    /// Number of triggers with remembered state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, key: TriggerKey) -> Arc<Mutex<TriggerState>> {
        if let Some(entry) = self
            .states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(entry);
        }
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(states.entry(key).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: TriggerKey = TriggerKey::from_raw(1);

    fn level() -> Observation {
        Observation::Matched(Occurrence::Level)
    }

    #[test]
    fn should_fire_once_on_rising_edge() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Fire);
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Hold);
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Hold);
    }

    #[test]
    fn should_fire_again_after_condition_clears() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        tracker.observe(KEY, level(), now);
        assert_eq!(tracker.observe(KEY, Observation::Cleared, now), Transition::Rearm);
        assert_eq!(tracker.observe(KEY, Observation::Cleared, now), Transition::Idle);
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Fire);
    }

    #[test]
    fn should_fire_scheduled_trigger_once_per_occurrence() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        let today = Observation::Matched(Occurrence::Scheduled(739_000));
        let tomorrow = Observation::Matched(Occurrence::Scheduled(739_001));
        assert_eq!(tracker.observe(KEY, today, now), Transition::Fire);
        assert_eq!(tracker.observe(KEY, today, now), Transition::Hold);
        assert_eq!(tracker.observe(KEY, Observation::Cleared, now), Transition::Idle);
        assert_eq!(tracker.observe(KEY, today, now), Transition::Hold);
        assert_eq!(tracker.observe(KEY, tomorrow, now), Transition::Fire);
    }

    #[test]
    fn should_record_last_fired_instant() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        tracker.observe(KEY, level(), now);
        let state = tracker.state(KEY).unwrap();
        assert!(state.armed);
        assert_eq!(state.last_fired, Some(now));
    }

    #[test]
    fn should_keep_triggers_independent() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        let other = TriggerKey::from_raw(2);
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Fire);
        assert_eq!(tracker.observe(other, level(), now), Transition::Fire);
    }

    #[test]
    fn should_forget_pruned_triggers() {
        let tracker = StateTracker::new();
        let now = trygr_domain::time::now();
        let other = TriggerKey::from_raw(2);
        tracker.observe(KEY, level(), now);
        tracker.observe(other, level(), now);

        tracker.retain(&HashSet::from([other]));

        assert_eq!(tracker.len(), 1);
        assert!(tracker.state(KEY).is_none());
        assert_eq!(tracker.observe(KEY, level(), now), Transition::Fire);
        assert_eq!(tracker.observe(other, level(), now), Transition::Hold);
    }

    #[test]
    fn should_fire_once_when_same_trigger_is_observed_from_many_threads() {
        let tracker = Arc::new(StateTracker::new());
        let now = trygr_domain::time::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.observe(KEY, level(), now))
            })
            .collect();
        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|t| *t == Transition::Fire)
            .count();
        assert_eq!(fired, 1);
    }
}
