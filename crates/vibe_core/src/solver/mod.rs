//! Power activation solver
//!
//! Pipeline per chart:
//! `EventTimeline` -> `SpanGenerator` (per tier) -> `ActivationBuilder`
//! -> `OptimalPathSolver` -> [`PowerPlan`].

pub mod activations;
pub mod optimal;
pub mod spans;
pub mod types;

pub use activations::{ActivationBuilder, ActivationWindow};
pub use optimal::{OptimalPathSolver, OptimalSelection};
pub use spans::{ActivationSpan, SpanGenerator};
pub use types::{Activation, PowerPlan, Tier, TierPlan};

use crate::beat_map::{BeatMap, MAX_EVENT_BEAT};
use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::timeline::{EventTimeline, TimelineEvent};
use tracing::{debug, info};

/// Computes the score-optimal activation plan for a time-sorted event list.
pub fn solve(events: &[TimelineEvent], beat_map: &BeatMap, config: &SolverConfig) -> Result<PowerPlan> {
    config.validate()?;
    let timeline = EventTimeline::new(events)?;
    check_beat_range(events, beat_map)?;

    Ok(solve_timeline(&timeline, beat_map, config))
}

fn check_beat_range(events: &[TimelineEvent], beat_map: &BeatMap) -> Result<()> {
    for (index, event) in events.iter().enumerate() {
        let beat = beat_map.beat_from_time(event.time);
        if !beat.is_finite() || beat.abs() > MAX_EVENT_BEAT {
            return Err(SolverError::EventBeatOutOfRange { index, beat });
        }
    }
    Ok(())
}

/// Solves an already built timeline. The two tiers are generated in parallel.
pub fn solve_timeline(timeline: &EventTimeline, beat_map: &BeatMap, config: &SolverConfig) -> PowerPlan {
    if timeline.is_empty() {
        debug!("Empty timeline, nothing to solve");
        return PowerPlan::empty();
    }

    let (single, double) = rayon::join(
        || tier_windows(timeline, beat_map, config, Tier::Single),
        || tier_windows(timeline, beat_map, config, Tier::Double),
    );

    let selection = OptimalPathSolver::new(timeline, &single, &double).solve();

    let single_plan = TierPlan::new(
        Tier::Single,
        ActivationBuilder::new(timeline, beat_map, Tier::Single).to_activations(&single),
        selection.single,
    );
    let double_plan = TierPlan::new(
        Tier::Double,
        ActivationBuilder::new(timeline, beat_map, Tier::Double).to_activations(&double),
        selection.double,
    );

    info!(
        "Solved {} event groups: best bonus {} ({} single / {} double activations, {} / {} optimal)",
        timeline.len(),
        selection.total_score,
        single_plan.len(),
        double_plan.len(),
        single_plan.optimal_indices().len(),
        double_plan.optimal_indices().len()
    );

    PowerPlan { total_score: selection.total_score, single: single_plan, double: double_plan }
}

fn tier_windows(
    timeline: &EventTimeline,
    beat_map: &BeatMap,
    config: &SolverConfig,
    tier: Tier,
) -> Vec<ActivationWindow> {
    let generator = SpanGenerator::new(timeline, beat_map, config, tier);
    let spans = generator.generate();
    let span_count = spans.len();
    let windows = ActivationBuilder::new(timeline, beat_map, tier).sweep(spans, generator.eligible_index());

    debug!("{:?} tier: {} candidate spans collapsed into {} windows", tier, span_count, windows.len());

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn at_120(specs: &[(f64, i32, bool)]) -> Vec<TimelineEvent> {
        specs
            .iter()
            .map(|&(time, score, grants_charge)| TimelineEvent {
                time,
                beat: time * 2.0 + 1.0,
                score,
                grants_charge,
            })
            .collect()
    }

    fn map_120() -> BeatMap {
        BeatMap::constant(120.0, 4).unwrap()
    }

    #[test]
    fn test_empty_timeline() {
        let plan = solve(&[], &map_120(), &SolverConfig::default()).unwrap();
        assert_eq!(plan, PowerPlan::empty());
    }

    #[test]
    fn test_quantized_boundary_decides_late_event() {
        let events = at_120(&[(0.0, 0, true), (2.0, 10, false), (6.0, 20, false)]);
        let plan = solve(&events, &map_120(), &SolverConfig::default()).unwrap();

        assert_eq!(plan.total_score, 30);
        assert!(plan.double.is_empty(), "one grant cannot bank two charges");

        let single = plan.single.activations();
        let scores: Vec<i64> = single.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![10, 30, 20, 0]);

        // 5s of charge plus a 0.05s grid overhang reaches t=6 from t=0.95.
        assert!((single[1].min_start_time - 0.95).abs() < EPS);
        assert!((single[0].max_start_time - 0.95).abs() < EPS);
        assert!((single[1].last_hit_time - 6.0).abs() < EPS);
        assert!((single[0].last_hit_time - 2.0).abs() < EPS);

        assert_eq!(plan.single.optimal_indices().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_tied_activations_are_all_optimal() {
        let events = at_120(&[(0.0, 0, true), (2.0, 10, false), (9.0, 10, false)]);
        let plan = solve(&events, &map_120(), &SolverConfig::default()).unwrap();

        assert_eq!(plan.total_score, 10);
        // The t=2 and t=9 hits are more than one charge apart: either one is worth 10.
        let optimal: Vec<usize> = plan.single.optimal_indices().iter().copied().collect();
        assert_eq!(optimal, vec![0, 2]);
        assert!(plan.single.optimal_activations().all(|a| a.score == 10));
    }

    #[test]
    fn test_solve_is_deterministic() {
        let events = at_120(&[
            (0.0, 0, true),
            (1.0, 5, false),
            (1.5, 0, true),
            (3.0, 8, false),
            (7.5, 12, false),
            (9.0, 3, false),
            (12.25, 20, false),
        ]);
        let first = solve(&events, &map_120(), &SolverConfig::default()).unwrap();
        let second = solve(&events, &map_120(), &SolverConfig::default()).unwrap();
        assert_eq!(first, second);
        assert!(!first.double.is_empty());
    }

    #[test]
    fn test_single_grant_without_scores() {
        let events = at_120(&[(3.0, 0, true)]);
        let plan = solve(&events, &map_120(), &SolverConfig::default()).unwrap();

        assert_eq!(plan.total_score, 0);
        assert_eq!(plan.single.len(), 1);
        assert_eq!(plan.single.activations()[0].score, 0);
        assert!(plan.double.is_empty());
    }

    #[test]
    fn test_event_beyond_beat_range_is_rejected() {
        let map = BeatMap::with_timings(120.0, 4, vec![0.0, 0.5, 1.0]).unwrap();
        let events = vec![TimelineEvent::charge(0.0, 1.0), TimelineEvent::hit(1e300, 2e300, 5)];

        let err = solve(&events, &map, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::EventBeatOutOfRange { index: 1, .. }), "got {err:?}");
        assert!(err.is_input_error());

        let before = vec![TimelineEvent::hit(-1e300, -2e300, 5)];
        let err = solve(&before, &map_120(), &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::EventBeatOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SolverConfig { charge_seconds: -1.0, ..SolverConfig::default() };
        let err = solve(&[], &map_120(), &config).unwrap_err();
        assert!(!err.is_input_error());
    }
}
