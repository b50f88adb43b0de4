//! Event Timeline
//!
//! Raw hits that share a timestamp are merged into one [`EventGroup`]. The
//! timeline then answers the index queries the span sweep needs. Out of range
//! indices resolve to infinite times so sweep loops can run off either end
//! without special cases.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// One scoring or charge-granting event, already placed on the beat map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub time: f64,
    pub beat: f64,
    pub score: i32,
    pub grants_charge: bool,
}

impl TimelineEvent {
    pub fn hit(time: f64, beat: f64, score: i32) -> Self {
        Self { time, beat, score, grants_charge: false }
    }

    pub fn charge(time: f64, beat: f64) -> Self {
        Self { time, beat, score: 0, grants_charge: true }
    }
}

/// All events at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventGroup {
    pub time: f64,
    pub beat: f64,
    pub score: i64,
    pub grants_charge: bool,
}

#[derive(Debug, Clone)]
pub struct EventTimeline {
    groups: Vec<EventGroup>,
    next_grants: Vec<usize>,
    // One entry per index in 0..=len
    previous_grants: Vec<Option<usize>>,
}

impl EventTimeline {
    /// Builds the timeline from time-sorted events.
    pub fn new(events: &[TimelineEvent]) -> Result<Self> {
        let mut groups: Vec<EventGroup> = Vec::new();
        let mut pending: Option<EventGroup> = None;

        for (index, event) in events.iter().enumerate() {
            if !event.time.is_finite() {
                return Err(SolverError::NonFiniteEventTime { index });
            }
            if event.score < 0 {
                return Err(SolverError::NegativeScore { index, score: event.score });
            }

            match pending.as_mut() {
                Some(group) if event.time < group.time => {
                    return Err(SolverError::NonMonotonicEvents {
                        index,
                        previous: group.time,
                        found: event.time,
                    });
                }
                Some(group) if event.time == group.time => {
                    group.score += i64::from(event.score);
                    group.grants_charge |= event.grants_charge;
                    continue;
                }
                _ => {}
            }

            if let Some(group) = pending.take() {
                push_if_informative(&mut groups, group);
            }
            pending = Some(EventGroup {
                time: event.time,
                beat: event.beat,
                score: i64::from(event.score),
                grants_charge: event.grants_charge,
            });
        }

        if let Some(group) = pending {
            push_if_informative(&mut groups, group);
        }

        let count = groups.len();
        let mut next_grants = vec![count; count];
        let mut next = count;
        for index in (0..count).rev() {
            if groups[index].grants_charge {
                next = index;
            }
            next_grants[index] = next;
        }

        let mut previous_grants = Vec::with_capacity(count + 1);
        let mut previous = None;
        for (index, group) in groups.iter().enumerate() {
            previous_grants.push(previous);
            if group.grants_charge {
                previous = Some(index);
            }
        }
        previous_grants.push(previous);

        Ok(Self { groups, next_grants, previous_grants })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[EventGroup] {
        &self.groups
    }

    pub fn score_at(&self, index: usize) -> i64 {
        self.groups.get(index).map_or(0, |group| group.score)
    }

    pub fn grants_charge_at(&self, index: usize) -> bool {
        self.groups.get(index).is_some_and(|group| group.grants_charge)
    }

    /// Time of group `index`, `+inf` past the end.
    pub fn time_at(&self, index: usize) -> f64 {
        self.groups.get(index).map_or(f64::INFINITY, |group| group.time)
    }

    /// Beat of group `index`, `+inf` past the end.
    pub fn beat_at(&self, index: usize) -> f64 {
        self.groups.get(index).map_or(f64::INFINITY, |group| group.beat)
    }

    /// Time of group `index - 1`, `-inf` before the start.
    pub fn time_before(&self, index: usize) -> f64 {
        match index.checked_sub(1) {
            Some(previous) => self.time_at(previous),
            None => f64::NEG_INFINITY,
        }
    }

    /// Beat of group `index - 1`, `-inf` before the start.
    pub fn beat_before(&self, index: usize) -> f64 {
        match index.checked_sub(1) {
            Some(previous) => self.beat_at(previous),
            None => f64::NEG_INFINITY,
        }
    }

    pub fn time_of_grant(&self, grant: Option<usize>) -> f64 {
        grant.map_or(f64::NEG_INFINITY, |index| self.time_at(index))
    }

    /// Smallest grant index `>= index`, or `len()` when none remain.
    pub fn next_grant(&self, index: usize) -> usize {
        self.next_grants.get(index).copied().unwrap_or(self.groups.len())
    }

    /// Largest grant index `< index`.
    pub fn previous_grant(&self, index: usize) -> Option<usize> {
        let index = index.min(self.groups.len());
        self.previous_grants[index]
    }

    /// First index whose time is strictly greater than `time`.
    pub fn first_index_after(&self, time: f64) -> usize {
        self.groups.partition_point(|group| group.time <= time)
    }
}

fn push_if_informative(groups: &mut Vec<EventGroup>, group: EventGroup) {
    if group.score != 0 || group.grants_charge {
        groups.push(group);
    }
}
