//! Optimal Path Solver
//!
//! Nothing observable changes between two grants, so every position that has
//! the same next grant shares one state. A state's best value is the best
//! activation startable from it plus the best value of the state it leaves the
//! player in.
//!
//! Ties are kept. Every activation reaching a state's best value is recorded
//! so that all optimal strategies can be reported, not just one.

use super::activations::ActivationWindow;
use crate::timeline::EventTimeline;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
struct BestNext {
    value: i64,
    single: Vec<usize>,
    double: Vec<usize>,
}

/// Best total and the optimal members of each tier, by window index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimalSelection {
    pub total_score: i64,
    pub single: BTreeSet<usize>,
    pub double: BTreeSet<usize>,
}

pub struct OptimalPathSolver<'a> {
    timeline: &'a EventTimeline,
    single: &'a [ActivationWindow],
    double: &'a [ActivationWindow],
}

impl<'a> OptimalPathSolver<'a> {
    /// Both window lists must be ordered by start time, as produced by
    /// [`super::activations::ActivationBuilder::sweep`].
    pub fn new(
        timeline: &'a EventTimeline,
        single: &'a [ActivationWindow],
        double: &'a [ActivationWindow],
    ) -> Self {
        Self { timeline, single, double }
    }

    pub fn solve(&self) -> OptimalSelection {
        let table = self.best_next_table();
        let root = self.timeline.next_grant(0);
        let (single, double) = self.mark_optimal(&table, root);

        OptimalSelection { total_score: table[root].value, single, double }
    }

    /// State reached once an activation covering up to `end_index` finishes.
    fn state_after(&self, end_index: usize) -> usize {
        self.timeline.next_grant(end_index)
    }

    /// Fills the table for every grant state, last first.
    ///
    /// A candidate from state `s` starts after `s` and so ends in a state
    /// greater than `s`, which makes a single backwards pass sufficient.
    fn best_next_table(&self) -> Vec<BestNext> {
        let count = self.timeline.len();
        let mut table = vec![BestNext::default(); count + 1];

        for state in (0..count).rev() {
            if self.timeline.grants_charge_at(state) {
                table[state] = self.evaluate(state, &table);
            }
        }

        table
    }

    fn evaluate(&self, first_grant: usize, table: &[BestNext]) -> BestNext {
        let second_grant = self.timeline.next_grant(first_grant + 1);
        let mut best = BestNext::default();

        // One banked charge: start before the second grant is collected.
        let from = self.single.partition_point(|window| window.start_index <= first_grant);
        let to = self.single.partition_point(|window| window.start_index <= second_grant);

        for index in from..to {
            let window = &self.single[index];
            let value = window.score + table[self.state_after(window.end_index)].value;

            if value > best.value {
                best.value = value;
                best.single.clear();
            }

            if value == best.value {
                best.single.push(index);
            }
        }

        // Two banked charges: only after the second grant.
        let from = self.double.partition_point(|window| window.start_index <= second_grant);

        for (index, window) in self.double.iter().enumerate().skip(from) {
            let value = window.score + table[self.state_after(window.end_index)].value;

            if value > best.value {
                best.value = value;
                best.single.clear();
                best.double.clear();
            }

            if value == best.value {
                best.double.push(index);
            }
        }

        best
    }

    fn mark_optimal(&self, table: &[BestNext], root: usize) -> (BTreeSet<usize>, BTreeSet<usize>) {
        let mut single = BTreeSet::new();
        let mut double = BTreeSet::new();
        let mut pending = vec![root];

        while let Some(state) = pending.pop() {
            let best = &table[state];

            for &index in &best.single {
                if single.insert(index) {
                    pending.push(self.state_after(self.single[index].end_index));
                }
            }

            for &index in &best.double {
                if double.insert(index) {
                    pending.push(self.state_after(self.double[index].end_index));
                }
            }
        }

        (single, double)
    }
}
