//! Span Generator
//!
//! Enumerates every start time at which the set of events an activation
//! covers changes. Three sources feed one candidate list:
//!
//! 1. starting right after each event,
//! 2. running out exactly as each event's acceptance window closes,
//! 3. running out exactly on a tempo anchor whose beat length change moves an
//!    acceptance boundary across the next event.
//!
//! Sources 2 and 3 are walked backwards from the depletion point through the
//! grants that could have refilled the pool.

use super::types::Tier;
use crate::beat_map::BeatMap;
use crate::config::SolverConfig;
use crate::timeline::EventTimeline;

/// Candidate start window. `end_index` is one past the last covered event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationSpan {
    pub start_time: f64,
    pub start_index: usize,
    pub end_index: usize,
}

impl ActivationSpan {
    pub fn new(start_time: f64, start_index: usize, end_index: usize) -> Self {
        // A depletion before the first covered event covers nothing.
        Self { start_time, start_index, end_index: end_index.max(start_index) }
    }
}

pub struct SpanGenerator<'a> {
    timeline: &'a EventTimeline,
    beat_map: &'a BeatMap,
    config: &'a SolverConfig,
    tier: Tier,
}

impl<'a> SpanGenerator<'a> {
    pub fn new(
        timeline: &'a EventTimeline,
        beat_map: &'a BeatMap,
        config: &'a SolverConfig,
        tier: Tier,
    ) -> Self {
        Self { timeline, beat_map, config, tier }
    }

    pub fn eligible_index(&self) -> usize {
        self.tier.eligible_index(self.timeline)
    }

    /// All candidate spans, unsorted and possibly duplicated.
    pub fn generate(&self) -> Vec<ActivationSpan> {
        let eligible = self.eligible_index();
        let count = self.timeline.len();

        if eligible >= count {
            return Vec::new();
        }

        let mut spans = Vec::with_capacity(2 * count);

        for index in eligible..count {
            spans.push(self.span_after_hit(index, self.tier.charges()));
        }

        for index in eligible..count {
            self.spans_ending_on_hit(index, &mut spans);
        }

        self.spans_ending_on_tempo_changes(&mut spans);

        spans
    }

    /// Beats by which the acceptance window overhangs the input grid.
    ///
    /// The window is `hit_window_seconds` wide in real time, but the host only
    /// recognises whole `1 / beat_divisions` steps of it. The remainder lets a
    /// hit count slightly after the pool is literally empty.
    pub fn grid_overhang(&self, beat_length: f64) -> f64 {
        let window_beats = self.config.hit_window_seconds / beat_length;
        let divisions = f64::from(self.beat_map.beat_divisions());

        window_beats - (window_beats * divisions).floor() / divisions
    }

    /// Latest time an event still counts when the pool empties at `zero_time`.
    pub fn quantized_deadline(&self, zero_time: f64) -> f64 {
        let map = self.beat_map;
        let overhang = self.grid_overhang(map.beat_length_at_time(zero_time));
        let latest = map.time_from_beat(map.beat_from_time(zero_time) + overhang);
        let next_event = self.timeline.time_at(self.timeline.first_index_after(zero_time));

        latest.min(next_event)
    }

    /// Simulates an activation of `charges` starting at `start_time`, with
    /// `first_index` the first event it can cover.
    pub fn simulate_from(&self, start_time: f64, first_index: usize, charges: u32) -> ActivationSpan {
        let timeline = self.timeline;
        let unit = self.config.charge_seconds;
        let cap = self.config.max_active_seconds();

        let mut current = start_time;
        let mut remaining = f64::from(charges) * unit;
        let mut deadline = self.quantized_deadline(current + remaining);
        let mut next_grant = timeline.next_grant(first_index);

        while next_grant < timeline.len() {
            let grant_time = timeline.time_at(next_grant);

            if grant_time > deadline {
                break;
            }

            // A grant always leaves at least one full charge, never more than the cap.
            remaining = (remaining - (grant_time - current) + unit).min(cap).max(unit);
            current = grant_time;
            deadline = self.quantized_deadline(current + remaining);
            next_grant = timeline.next_grant(next_grant + 1);
        }

        ActivationSpan::new(start_time, first_index, timeline.first_index_after(deadline))
    }

    fn span_after_hit(&self, index: usize, charges: u32) -> ActivationSpan {
        self.simulate_from(self.timeline.time_at(index), index + 1, charges)
    }

    /// End index when `last_hit` is the last event covered. A grant on the
    /// last event keeps the pool alive for one more charge.
    fn end_index_for_last_hit(&self, last_hit: Option<usize>) -> usize {
        match last_hit {
            Some(index) if self.timeline.grants_charge_at(index) => {
                self.span_after_hit(index, 1).end_index
            }
            Some(index) => index + 1,
            None => 0,
        }
    }

    fn spans_ending_on_hit(&self, index: usize, spans: &mut Vec<ActivationSpan>) {
        let map = self.beat_map;
        let end_time = self.timeline.time_at(index);
        let end_beat = map.beat_from_time(end_time);
        let previous_hit_time = self.timeline.time_before(index);
        let end_index = self.end_index_for_last_hit(Some(index));

        if !map.has_beat_timings() {
            let beat_length = map.beat_length_for_beat(end_beat as i64);
            let zero_time = map
                .time_from_beat(end_beat - self.grid_overhang(beat_length))
                .max(previous_hit_time);

            self.spans_ending_at_zero(zero_time, end_index, spans);
            return;
        }

        // The overhang depends on the beat length where the pool runs out, so
        // try every beat back to the previous event and keep self-consistent
        // depletion points.
        let mut beat = end_beat as i64;
        while beat >= 1 {
            let beat_time = map.time_at_beat_index(beat);
            let next_beat_time = map.time_at_beat_index(beat.saturating_add(1));
            let zero_time = map
                .time_from_beat(end_beat - self.grid_overhang(next_beat_time - beat_time))
                .max(previous_hit_time);

            if zero_time > beat_time && zero_time < next_beat_time {
                self.spans_ending_at_zero(zero_time, end_index, spans);
            }

            if beat_time <= previous_hit_time {
                break;
            }

            beat -= 1;
        }
    }

    fn spans_ending_on_tempo_changes(&self, spans: &mut Vec<ActivationSpan>) {
        let map = self.beat_map;
        let timings = map.beat_timings();

        if timings.len() <= 2 {
            return;
        }

        for anchor in 1..timings.len() - 1 {
            let beat_time = timings[anchor];
            let beat = (anchor + 1) as f64;
            let end_with_previous_length =
                map.time_from_beat(beat + self.grid_overhang(beat_time - timings[anchor - 1]));
            let end_with_next_length =
                map.time_from_beat(beat + self.grid_overhang(timings[anchor + 1] - beat_time));
            let next_hit = self.timeline.first_index_after(beat_time);
            let next_hit_time = self.timeline.time_at(next_hit);

            let covered_with_previous = end_with_previous_length >= next_hit_time;
            let covered_with_next = end_with_next_length >= next_hit_time;

            if covered_with_previous == covered_with_next {
                continue;
            }

            let last_hit = if covered_with_next { Some(next_hit) } else { next_hit.checked_sub(1) };
            let end_index = self.end_index_for_last_hit(last_hit);

            self.spans_ending_at_zero(beat_time, end_index, spans);
        }
    }

    /// Every start time whose pool runs dry exactly at `zero_time`.
    ///
    /// Walks back through the grants before `zero_time`. Each grant passed
    /// means the activation needed more pool earlier on (`owed`). The walk
    /// stops once no refill pattern can explain the depletion.
    pub fn spans_ending_at_zero(&self, zero_time: f64, end_index: usize, spans: &mut Vec<ActivationSpan>) {
        let timeline = self.timeline;
        let unit = self.config.charge_seconds;
        let cap = self.config.max_active_seconds();
        let charge_time = f64::from(self.tier.charges()) * unit;

        let mut current = zero_time;
        let mut owed = 0.0;
        let mut previous = timeline.previous_grant(timeline.first_index_after(current));

        loop {
            let previous_time = timeline.time_of_grant(previous);
            let start_time = current - (charge_time - owed);
            let full_pool_at = current - (cap - owed);

            if start_time > previous_time {
                spans.push(ActivationSpan::new(
                    start_time,
                    timeline.first_index_after(start_time),
                    end_index,
                ));
            }

            if previous_time < full_pool_at {
                break;
            }

            owed = (owed + (current - previous_time) - unit).min(cap);

            if owed <= 0.0 {
                break;
            }

            let Some(grant) = previous else {
                break;
            };

            current = previous_time;
            previous = timeline.previous_grant(grant);

            if previous.is_none() {
                break;
            }
        }
    }
}
