//! Beat Map - time/beat conversion
//!
//! A chart is either played at one constant tempo or follows a table of beat
//! anchors, where `beat_timings[i]` is the time of beat `i + 1`. Outside the
//! table the boundary segment's slope is extrapolated.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// Largest beat magnitude an event may fall on. Integer beat walks stay
/// well inside `i64`.
pub const MAX_EVENT_BEAT: f64 = i32::MAX as f64;

/// Serialized form of a beat map, validated into a [`BeatMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatMapSpec {
    pub bpm: f64,
    pub beat_divisions: u32,
    #[serde(default)]
    pub beat_timings: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeatMapSpec", into = "BeatMapSpec")]
pub struct BeatMap {
    bpm: f64,
    beat_divisions: u32,
    beat_timings: Vec<f64>,
}

impl BeatMap {
    /// Constant tempo map.
    pub fn constant(bpm: f64, beat_divisions: u32) -> Result<Self> {
        Self::with_timings(bpm, beat_divisions, Vec::new())
    }

    /// Anchor table map. An empty table falls back to the constant `bpm`.
    pub fn with_timings(bpm: f64, beat_divisions: u32, beat_timings: Vec<f64>) -> Result<Self> {
        if beat_divisions < 1 {
            return Err(SolverError::InvalidBeatDivisions { divisions: beat_divisions });
        }
        if !bpm.is_finite() {
            return Err(SolverError::InvalidBpm { bpm });
        }
        if beat_timings.len() == 1 {
            return Err(SolverError::TooFewBeatTimings { found: 1, required: 2 });
        }
        for (index, &timing) in beat_timings.iter().enumerate() {
            if !timing.is_finite() {
                return Err(SolverError::NonFiniteBeatTiming { index });
            }
            if index > 0 && timing <= beat_timings[index - 1] {
                return Err(SolverError::NonMonotonicBeatTimings {
                    index,
                    previous: beat_timings[index - 1],
                    found: timing,
                });
            }
        }

        Ok(Self { bpm, beat_divisions, beat_timings })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Finest input grid: hits land on multiples of `1 / beat_divisions` beats.
    pub fn beat_divisions(&self) -> u32 {
        self.beat_divisions
    }

    pub fn beat_timings(&self) -> &[f64] {
        &self.beat_timings
    }

    pub fn has_beat_timings(&self) -> bool {
        !self.beat_timings.is_empty()
    }

    fn constant_beat_length(&self) -> f64 {
        60.0 / self.bpm.max(1.0)
    }

    pub fn beat_from_time(&self, time: f64) -> f64 {
        if time.is_infinite() {
            return time;
        }

        if !self.has_beat_timings() {
            return time / self.constant_beat_length() + 1.0;
        }

        let index = self.segment_at_time(time);
        let previous = self.beat_timings[index];
        let next = self.beat_timings[index + 1];

        index as f64 + 1.0 + (time - previous) / (next - previous)
    }

    pub fn time_from_beat(&self, beat: f64) -> f64 {
        if beat.is_infinite() {
            return beat;
        }

        if !self.has_beat_timings() {
            return self.constant_beat_length() * (beat - 1.0);
        }

        let timings = &self.beat_timings;
        let count = timings.len();

        if beat <= 1.0 {
            let first = timings[0];
            let second = timings[1];

            return first - (second - first) * (1.0 - beat);
        }

        if beat < count as f64 {
            let whole = beat as usize;
            let previous = timings[whole - 1];
            let next = timings[whole];

            return previous + (next - previous) * beat.fract();
        }

        let last = timings[count - 1];
        let second_to_last = timings[count - 2];

        last + (last - second_to_last) * (beat - count as f64)
    }

    /// Time of an integer beat. Exact on anchors, no fractional arithmetic.
    pub fn time_at_beat_index(&self, beat: i64) -> f64 {
        if !self.has_beat_timings() {
            return self.constant_beat_length() * (beat - 1) as f64;
        }

        let timings = &self.beat_timings;
        let count = timings.len() as i64;

        if beat < 1 {
            let first = timings[0];
            let second = timings[1];

            return first - (second - first) * (1 - beat) as f64;
        }

        if beat <= count {
            return timings[(beat - 1) as usize];
        }

        let last = timings[timings.len() - 1];
        let second_to_last = timings[timings.len() - 2];

        last + (last - second_to_last) * (beat - count) as f64
    }

    pub fn beat_length_at_time(&self, time: f64) -> f64 {
        if !self.has_beat_timings() {
            return self.constant_beat_length();
        }

        let index = self.segment_at_time(time);

        self.beat_timings[index + 1] - self.beat_timings[index]
    }

    /// Length of the segment starting at integer `beat`.
    pub fn beat_length_for_beat(&self, beat: i64) -> f64 {
        if !self.has_beat_timings() {
            return self.constant_beat_length();
        }

        let timings = &self.beat_timings;
        let count = timings.len() as i64;

        if beat < 1 {
            return timings[1] - timings[0];
        }

        if beat < count {
            let beat = beat as usize;
            return timings[beat] - timings[beat - 1];
        }

        timings[timings.len() - 1] - timings[timings.len() - 2]
    }

    /// Index of the anchor segment containing `time`, clamped to the table.
    fn segment_at_time(&self, time: f64) -> usize {
        let at_or_before = self.beat_timings.partition_point(|&timing| timing <= time);

        at_or_before.saturating_sub(1).min(self.beat_timings.len() - 2)
    }
}

impl TryFrom<BeatMapSpec> for BeatMap {
    type Error = SolverError;

    fn try_from(spec: BeatMapSpec) -> Result<Self> {
        Self::with_timings(spec.bpm, spec.beat_divisions, spec.beat_timings)
    }
}

impl From<BeatMap> for BeatMapSpec {
    fn from(map: BeatMap) -> Self {
        Self { bpm: map.bpm, beat_divisions: map.beat_divisions, beat_timings: map.beat_timings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn tempo_change_map() -> BeatMap {
        // Half-second beats up to beat 3, then one-second beats.
        BeatMap::with_timings(120.0, 4, vec![0.0, 0.5, 1.0, 2.0]).unwrap()
    }

    #[test]
    fn test_constant_tempo_conversion() {
        let map = BeatMap::constant(120.0, 4).unwrap();
        assert!((map.beat_from_time(0.0) - 1.0).abs() < EPS);
        assert!((map.beat_from_time(2.0) - 5.0).abs() < EPS);
        assert!((map.time_from_beat(5.0) - 2.0).abs() < EPS);
        assert!((map.time_at_beat_index(3) - 1.0).abs() < EPS);
        assert!((map.beat_length_at_time(100.0) - 0.5).abs() < EPS);
        assert!((map.beat_length_for_beat(-4) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_bpm_clamped_to_one() {
        let map = BeatMap::constant(0.0, 1).unwrap();
        assert!((map.beat_length_at_time(0.0) - 60.0).abs() < EPS);
        assert!((map.beat_from_time(60.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_infinities_are_preserved() {
        let map = tempo_change_map();
        assert_eq!(map.beat_from_time(f64::INFINITY), f64::INFINITY);
        assert_eq!(map.beat_from_time(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert_eq!(map.time_from_beat(f64::INFINITY), f64::INFINITY);
        assert_eq!(map.time_from_beat(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_anchor_table_inside() {
        let map = tempo_change_map();
        assert!((map.beat_from_time(0.25) - 1.5).abs() < EPS);
        assert!((map.beat_from_time(1.5) - 3.5).abs() < EPS);
        assert!((map.time_from_beat(1.5) - 0.25).abs() < EPS);
        assert!((map.time_from_beat(3.5) - 1.5).abs() < EPS);
        assert!((map.time_at_beat_index(4) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_anchor_table_extrapolates() {
        let map = tempo_change_map();
        // Before the first anchor: slope of the first segment
        assert!((map.beat_from_time(-0.5) - 0.0).abs() < EPS);
        assert!((map.time_from_beat(0.0) + 0.5).abs() < EPS);
        assert!((map.time_at_beat_index(0) + 0.5).abs() < EPS);
        // After the last anchor: slope of the last segment
        assert!((map.beat_from_time(3.0) - 5.0).abs() < EPS);
        assert!((map.time_from_beat(5.0) - 3.0).abs() < EPS);
        assert!((map.time_at_beat_index(6) - 4.0).abs() < EPS);
    }

    #[test]
    fn test_anchor_table_beat_lengths() {
        let map = tempo_change_map();
        assert!((map.beat_length_at_time(0.7) - 0.5).abs() < EPS);
        assert!((map.beat_length_at_time(1.2) - 1.0).abs() < EPS);
        assert!((map.beat_length_at_time(-3.0) - 0.5).abs() < EPS);
        assert!((map.beat_length_at_time(30.0) - 1.0).abs() < EPS);
        assert!((map.beat_length_for_beat(0) - 0.5).abs() < EPS);
        assert!((map.beat_length_for_beat(1) - 0.5).abs() < EPS);
        assert!((map.beat_length_for_beat(3) - 1.0).abs() < EPS);
        assert!((map.beat_length_for_beat(10) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_round_trip_across_tempo_change() {
        let map = tempo_change_map();
        for &time in &[-1.0, 0.1, 0.49, 0.5, 0.99, 1.0, 1.75, 2.0, 7.3] {
            let back = map.time_from_beat(map.beat_from_time(time));
            assert!((back - time).abs() < EPS, "time {} came back as {}", time, back);
        }
    }

    #[test]
    fn test_rejects_malformed_maps() {
        assert_eq!(
            BeatMap::constant(120.0, 0),
            Err(SolverError::InvalidBeatDivisions { divisions: 0 })
        );
        assert_eq!(
            BeatMap::with_timings(120.0, 4, vec![1.0]),
            Err(SolverError::TooFewBeatTimings { found: 1, required: 2 })
        );
        assert!(matches!(
            BeatMap::with_timings(120.0, 4, vec![0.0, 0.5, 0.5]),
            Err(SolverError::NonMonotonicBeatTimings { index: 2, .. })
        ));
        assert!(matches!(
            BeatMap::with_timings(120.0, 4, vec![0.0, f64::NAN]),
            Err(SolverError::NonFiniteBeatTiming { index: 1 })
        ));
        assert!(matches!(BeatMap::constant(f64::NAN, 4), Err(SolverError::InvalidBpm { .. })));
    }

    #[test]
    fn test_spec_deserialization_validates() {
        let ok: BeatMap =
            serde_json::from_str(r#"{ "bpm": 100.0, "beat_divisions": 2 }"#).unwrap();
        assert!(!ok.has_beat_timings());
        assert_eq!(ok.beat_divisions(), 2);

        let bad = serde_json::from_str::<BeatMap>(
            r#"{ "bpm": 100.0, "beat_divisions": 0, "beat_timings": [] }"#,
        );
        assert!(bad.is_err());
    }
}
