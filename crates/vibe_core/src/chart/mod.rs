//! Chart documents
//!
//! A chart is the captured hit list of one song at one difficulty, together
//! with the tempo map it was recorded against. Solving a chart produces a
//! [`SolvedChart`] carrying the summary and the power plan.

pub mod io;

use crate::beat_map::{BeatMap, BeatMapSpec};
use crate::config::SolverConfig;
use crate::error::Result;
use crate::solver::{self, PowerPlan};
use crate::timeline::TimelineEvent;
use crate::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Bonus per whole beat a hold note is held.
pub const HOLD_SCORE_PER_BEAT: i64 = 333;

/// Flat bonus every scoring hit adds on top of its own score.
pub const HIT_BASE_BONUS: i64 = 2;

fn default_schema_version() -> u8 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    #[default]
    Tap,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub time: f64,
    pub beat: f64,
    /// Equal to `time` for taps.
    pub end_time: f64,
    pub end_beat: f64,
    #[serde(default)]
    pub column: i32,
    pub score: i32,
    #[serde(default)]
    pub grants_charge: bool,
    #[serde(default)]
    pub kind: HitKind,
}

impl Hit {
    pub fn tap(time: f64, beat: f64, score: i32) -> Self {
        Self { time, beat, end_time: time, end_beat: beat, column: 0, score, grants_charge: false, kind: HitKind::Tap }
    }

    pub fn charge(time: f64, beat: f64) -> Self {
        Self { grants_charge: true, ..Self::tap(time, beat, 0) }
    }

    pub fn hold(time: f64, beat: f64, end_time: f64, end_beat: f64, score: i32) -> Self {
        Self { end_time, end_beat, kind: HitKind::Hold, ..Self::tap(time, beat, score) }
    }

    pub fn to_event(&self) -> TimelineEvent {
        TimelineEvent { time: self.time, beat: self.beat, score: self.score, grants_charge: self.grants_charge }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub is_custom: bool,
    pub beat_map: BeatMapSpec,
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartSummary {
    /// Highest score reachable without any power bonus.
    pub max_base_score: i64,
    pub max_combo: usize,
    pub hit_count: usize,
    pub charge_count: usize,
}

/// A chart with its summary and optimal power plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedChart {
    pub schema_version: u8,
    pub chart: ChartDocument,
    pub summary: ChartSummary,
    pub plan: PowerPlan,
}

impl SolvedChart {
    /// Base score plus the best power bonus.
    pub fn max_total_score(&self) -> i64 {
        self.summary.max_base_score + self.plan.total_score
    }
}

impl ChartDocument {
    pub fn new(name: impl Into<String>, beat_map: BeatMapSpec, hits: Vec<Hit>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            id: String::new(),
            difficulty: String::new(),
            is_custom: false,
            beat_map,
            hits,
        }
    }

    pub fn beat_map(&self) -> Result<BeatMap> {
        BeatMap::try_from(self.beat_map.clone())
    }

    /// Solver events in time order. Hits sharing a time keep document order.
    pub fn events(&self) -> Vec<TimelineEvent> {
        let mut events: Vec<TimelineEvent> = self.hits.iter().map(Hit::to_event).collect();
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        events
    }

    pub fn summary(&self) -> ChartSummary {
        let mut summary = ChartSummary { hit_count: self.hits.len(), ..ChartSummary::default() };

        for hit in &self.hits {
            if hit.grants_charge {
                summary.charge_count += 1;
                continue;
            }

            summary.max_combo += 1;
            summary.max_base_score += i64::from(hit.score) + HIT_BASE_BONUS;

            if hit.kind == HitKind::Hold {
                summary.max_base_score += HOLD_SCORE_PER_BEAT * (hit.end_beat - hit.beat).round() as i64;
            }
        }

        summary
    }

    pub fn solve(&self, config: &SolverConfig) -> Result<SolvedChart> {
        let beat_map = self.beat_map()?;
        let plan = solver::solve(&self.events(), &beat_map, config)?;

        Ok(SolvedChart { schema_version: SCHEMA_VERSION, chart: self.clone(), summary: self.summary(), plan })
    }
}
