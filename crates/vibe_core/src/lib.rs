//! # vibe_core - Score-Optimal Power Activation Planner
//!
//! Given a rhythm game chart (timed scoring hits and charge-granting hits)
//! and its tempo map, finds the highest bonus obtainable from activating
//! the decaying, rechargeable power meter, and every activation that takes
//! part in at least one optimal strategy.
//!
//! ## Features
//! - Tempo-quantized activation windows for constant or anchored tempo
//! - Exhaustive tie reporting for one- and two-charge activations
//! - JSON chart documents and solved output

#![allow(clippy::doc_lazy_continuation)]

pub mod beat_map;
pub mod chart;
pub mod config;
pub mod error;
pub mod solver;
pub mod timeline;

pub use beat_map::{BeatMap, BeatMapSpec};
pub use chart::{ChartDocument, ChartSummary, Hit, HitKind, SolvedChart};
pub use config::SolverConfig;
pub use error::{Result, SolverError};
pub use solver::{solve, Activation, PowerPlan, Tier, TierPlan};
pub use timeline::{EventTimeline, TimelineEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the chart and solved-chart JSON documents
pub const SCHEMA_VERSION: u8 = 1;
