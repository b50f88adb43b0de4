//! Public result types of the solver.

use crate::timeline::EventTimeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How many banked charges an activation spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Single,
    Double,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Single, Tier::Double];

    pub fn charges(self) -> u32 {
        match self {
            Tier::Single => 1,
            Tier::Double => 2,
        }
    }

    /// Index of the grant that banks the last charge this tier needs.
    ///
    /// Activations of this tier must start strictly after it. Equals
    /// `timeline.len()` when the chart never grants enough charges.
    pub fn eligible_index(self, timeline: &EventTimeline) -> usize {
        let first = timeline.next_grant(0);
        match self {
            Tier::Single => first,
            Tier::Double => timeline.next_grant(first + 1),
        }
    }
}

/// One distinct activation outcome.
///
/// Starting anywhere in `[min_start_time, max_start_time)` covers the same
/// events, the last of which is at `last_hit_time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub tier: Tier,
    pub min_start_time: f64,
    pub min_start_beat: f64,
    pub max_start_time: f64,
    pub max_start_beat: f64,
    pub last_hit_time: f64,
    pub last_hit_beat: f64,
    pub score: i64,
}

impl Activation {
    pub fn contains_start(&self, time: f64) -> bool {
        time >= self.min_start_time && time < self.max_start_time
    }
}

/// Activations of one tier plus the indices that lie on an optimal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPlan {
    tier: Tier,
    activations: Vec<Activation>,
    optimal: BTreeSet<usize>,
}

impl TierPlan {
    pub fn new(tier: Tier, activations: Vec<Activation>, optimal: BTreeSet<usize>) -> Self {
        Self { tier, activations, optimal }
    }

    pub fn empty(tier: Tier) -> Self {
        Self::new(tier, Vec::new(), BTreeSet::new())
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    pub fn is_optimal(&self, index: usize) -> bool {
        self.optimal.contains(&index)
    }

    pub fn optimal_indices(&self) -> &BTreeSet<usize> {
        &self.optimal
    }

    pub fn optimal_activations(&self) -> impl Iterator<Item = &Activation> + '_ {
        self.optimal.iter().filter_map(|&index| self.activations.get(index))
    }

    /// Activation whose start window contains `time`.
    pub fn activation_at(&self, time: f64) -> Option<(usize, &Activation)> {
        let index = self.activations.partition_point(|activation| activation.min_start_time <= time);
        let index = index.checked_sub(1)?;
        let activation = &self.activations[index];

        activation.contains_start(time).then_some((index, activation))
    }
}

/// Solver output: the best achievable bonus and every activation that can
/// take part in reaching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlan {
    pub total_score: i64,
    pub single: TierPlan,
    pub double: TierPlan,
}

impl PowerPlan {
    pub fn empty() -> Self {
        Self { total_score: 0, single: TierPlan::empty(Tier::Single), double: TierPlan::empty(Tier::Double) }
    }

    pub fn tier(&self, tier: Tier) -> &TierPlan {
        match tier {
            Tier::Single => &self.single,
            Tier::Double => &self.double,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineEvent;

    fn activation(min: f64, max: f64, score: i64) -> Activation {
        Activation {
            tier: Tier::Single,
            min_start_time: min,
            min_start_beat: min * 2.0 + 1.0,
            max_start_time: max,
            max_start_beat: max * 2.0 + 1.0,
            last_hit_time: max + 4.0,
            last_hit_beat: (max + 4.0) * 2.0 + 1.0,
            score,
        }
    }

    #[test]
    fn test_eligible_index_per_tier() {
        let timeline = EventTimeline::new(&[
            TimelineEvent::hit(0.0, 1.0, 1),
            TimelineEvent::charge(1.0, 3.0),
            TimelineEvent::hit(2.0, 5.0, 1),
            TimelineEvent::charge(3.0, 7.0),
        ])
        .unwrap();
        assert_eq!(Tier::Single.eligible_index(&timeline), 1);
        assert_eq!(Tier::Double.eligible_index(&timeline), 3);

        let lonely = EventTimeline::new(&[TimelineEvent::charge(0.0, 1.0)]).unwrap();
        assert_eq!(Tier::Single.eligible_index(&lonely), 0);
        assert_eq!(Tier::Double.eligible_index(&lonely), 1);
    }

    #[test]
    fn test_activation_at_lookup() {
        let plan = TierPlan::new(
            Tier::Single,
            vec![activation(0.0, 1.0, 10), activation(1.0, 2.5, 20), activation(2.5, 3.5, 5)],
            BTreeSet::from([1]),
        );

        assert_eq!(plan.activation_at(-0.1), None);
        assert_eq!(plan.activation_at(0.0).map(|(i, _)| i), Some(0));
        assert_eq!(plan.activation_at(1.0).map(|(i, _)| i), Some(1));
        assert_eq!(plan.activation_at(2.4).map(|(i, a)| (i, a.score)), Some((1, 20)));
        assert_eq!(plan.activation_at(3.5), None);

        assert!(plan.is_optimal(1));
        assert!(!plan.is_optimal(0));
        assert_eq!(plan.optimal_activations().map(|a| a.score).collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn test_empty_plan() {
        let plan = PowerPlan::empty();
        assert_eq!(plan.total_score, 0);
        assert!(plan.tier(Tier::Single).is_empty());
        assert!(plan.tier(Tier::Double).is_empty());
        assert_eq!(plan.tier(Tier::Double).tier(), Tier::Double);
    }
}
