//! Activation Builder
//!
//! Collapses the candidate spans of one tier into distinct, scored windows
//! and turns those into public [`Activation`] records.

use super::spans::ActivationSpan;
use super::types::{Activation, Tier};
use crate::beat_map::BeatMap;
use crate::timeline::EventTimeline;

/// Start window width given to the last activation of a tier (seconds).
pub const LAST_WINDOW_SECONDS: f64 = 1.0;

/// A surviving span with the total score of the events it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationWindow {
    pub min_start_time: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub score: i64,
}

pub struct ActivationBuilder<'a> {
    timeline: &'a EventTimeline,
    beat_map: &'a BeatMap,
    tier: Tier,
}

impl<'a> ActivationBuilder<'a> {
    pub fn new(timeline: &'a EventTimeline, beat_map: &'a BeatMap, tier: Tier) -> Self {
        Self { timeline, beat_map, tier }
    }

    /// Sorts `spans` and sweeps them into windows ordered by start time.
    ///
    /// Spans starting at or before `eligible` need a charge that has not been
    /// granted yet and are dropped. Among spans with the same start time the
    /// one covering the most events wins.
    pub fn sweep(&self, mut spans: Vec<ActivationSpan>, eligible: usize) -> Vec<ActivationWindow> {
        spans.sort_by(|a, b| {
            a.start_time.total_cmp(&b.start_time).then(a.end_index.cmp(&b.end_index))
        });

        let Some(first) = spans.first() else {
            return Vec::new();
        };

        let timeline = self.timeline;
        let mut start_ptr = first.start_index;
        let mut end_ptr = first.start_index;
        let mut score = 0i64;
        let mut windows: Vec<ActivationWindow> = Vec::new();

        for span in &spans {
            if span.start_index <= eligible {
                continue;
            }

            while start_ptr < span.start_index {
                score -= timeline.score_at(start_ptr);
                start_ptr += 1;
            }

            while end_ptr < span.end_index {
                score += timeline.score_at(end_ptr);
                end_ptr += 1;
            }

            while end_ptr > span.end_index {
                end_ptr -= 1;
                score -= timeline.score_at(end_ptr);
            }

            if let Some(last) = windows.last() {
                if last.min_start_time == span.start_time {
                    if last.end_index >= span.end_index {
                        continue;
                    }
                    windows.pop();
                }
            }

            windows.push(ActivationWindow {
                min_start_time: span.start_time,
                start_index: span.start_index,
                end_index: span.end_index,
                score,
            });
        }

        windows
    }

    pub fn to_activations(&self, windows: &[ActivationWindow]) -> Vec<Activation> {
        let map = self.beat_map;

        windows
            .iter()
            .enumerate()
            .map(|(index, window)| {
                let max_start_time = windows
                    .get(index + 1)
                    .map_or(window.min_start_time + LAST_WINDOW_SECONDS, |next| next.min_start_time);

                Activation {
                    tier: self.tier,
                    min_start_time: window.min_start_time,
                    min_start_beat: map.beat_from_time(window.min_start_time),
                    max_start_time,
                    max_start_beat: map.beat_from_time(max_start_time),
                    last_hit_time: self.timeline.time_before(window.end_index),
                    last_hit_beat: self.timeline.beat_before(window.end_index),
                    score: window.score,
                }
            })
            .collect()
    }
}
