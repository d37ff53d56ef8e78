//! Condition evaluation — pure matching of a trigger against one fact.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};

use super::schedule::{RelativeReference, parse_time_of_day};
use super::{Trigger, TriggerType};
use crate::error::MalformedTriggerError;
use crate::fact::{ClockTick, EvaluationFact};
use crate::location::Location;
use crate::time::Timestamp;
use crate::value::Value;

/// Result of evaluating one trigger against one fact.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The fact says nothing about this trigger (other kind, other device).
    Irrelevant,
    /// The fact is about this trigger and the condition is false.
    NoMatch,
    /// The condition holds.
    Matched {
        action_value: Value,
        occurrence: Occurrence,
    },
}

/// How the dedup tracker should interpret a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// A level condition that currently holds; fires on the rising edge.
    Level,
    /// A scheduled occurrence identified by the given key; fires once per key.
    Scheduled(i64),
}

impl Evaluation {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

impl Trigger {
    /// Evaluate the trigger against a fact.
    ///
    /// A fact of the wrong kind is [`Evaluation::Irrelevant`], never an error.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTriggerError`] when the trigger value cannot be
    /// coerced to what the trigger type needs; the caller treats the trigger
    /// as non-matching for the pass.
    pub fn evaluate(&self, fact: &EvaluationFact) -> Result<Evaluation, MalformedTriggerError> {
        let matched = match (self.trigger_type, fact) {
            (TriggerType::Device, EvaluationFact::Device(device)) => {
                if self.affected_device_id.as_ref() != Some(&device.id) {
                    return Ok(Evaluation::Irrelevant);
                }
                (device.status == self.trigger_value.as_text()).then_some(Occurrence::Level)
            }
            (TriggerType::MinTemp, EvaluationFact::Weather(location)) => {
                let threshold = self.trigger_value.as_number()?;
                (temperature(location) < threshold).then_some(Occurrence::Level)
            }
            (TriggerType::MaxTemp, EvaluationFact::Weather(location)) => {
                let threshold = self.trigger_value.as_number()?;
                (temperature(location) > threshold).then_some(Occurrence::Level)
            }
            (TriggerType::AbsoluteTime, EvaluationFact::Tick(tick)) => {
                let at = parse_time_of_day(&self.trigger_value.as_text())?;
                absolute_occurrence(at, tick)
            }
            (TriggerType::RelativeTime, EvaluationFact::Tick(tick)) => {
                let reference = RelativeReference::parse(&self.trigger_value)?;
                self.relative_occurrence(reference, tick)
            }
            _ => return Ok(Evaluation::Irrelevant),
        };
        Ok(match matched {
            Some(occurrence) => Evaluation::Matched {
                action_value: self.action_value.clone(),
                occurrence,
            },
            None => Evaluation::NoMatch,
        })
    }

    fn relative_occurrence(
        &self,
        reference: RelativeReference,
        tick: &ClockTick,
    ) -> Option<Occurrence> {
        let base = match reference {
            RelativeReference::Sunrise => tick.sunrise?,
            RelativeReference::Sunset => tick.sunset?,
            RelativeReference::Now => tick.loaded_at,
            RelativeReference::MinutesFromNow(minutes) => {
                tick.loaded_at.checked_add_signed(minutes_delta(minutes)?)?
            }
        };
        let offset = TimeDelta::try_minutes(i64::from(self.trigger_offset.unwrap_or(0)))?;
        let target = base.checked_add_signed(offset)?;
        in_window(target, tick).then_some(Occurrence::Scheduled(target.timestamp()))
    }
}

fn temperature(location: &Location) -> f64 {
    location.current_weather.temperature
}

/// Today's target, or yesterday's when the window straddles local midnight.
fn absolute_occurrence(at: NaiveTime, tick: &ClockTick) -> Option<Occurrence> {
    let today = tick.at.with_timezone(&tick.utc_offset).date_naive();
    [Some(today), today.pred_opt()]
        .into_iter()
        .flatten()
        .find(|day| local_instant(*day, at, tick).is_some_and(|target| in_window(target, tick)))
        .map(|day| Occurrence::Scheduled(i64::from(day.num_days_from_ce())))
}

fn local_instant(day: NaiveDate, at: NaiveTime, tick: &ClockTick) -> Option<Timestamp> {
    day.and_time(at)
        .and_local_timezone(tick.utc_offset)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Never early, at the latest on the first tick after the target.
fn in_window(target: Timestamp, tick: &ClockTick) -> bool {
    tick.since < target && target <= tick.at
}

#[allow(clippy::cast_possible_truncation)]
fn minutes_delta(minutes: f64) -> Option<TimeDelta> {
    if !minutes.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds((minutes * 60_000.0).round() as i64)
}
