//! Vibe CLI support
//!
//! Solver config resolution and batch chart solving used by the `vibe` binary.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{info, warn};
use vibe_core::chart::io::{load_chart_json, save_solved_json};
use vibe_core::{SolvedChart, SolverConfig};

pub const SOLVER_CONFIG_PATH_ENV: &str = "VIBE_SOLVER_CONFIG";

/// Config file to use: the explicit path, else a non-blank env value.
pub fn config_path(explicit: Option<PathBuf>, env_value: Option<String>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let value = env_value?;
        let value = value.trim();
        (!value.is_empty()).then(|| PathBuf::from(value))
    })
}

pub fn load_solver_config(path: &Path) -> Result<SolverConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read solver config '{}'", path.display()))?;

    let config = SolverConfig::from_json(&content)
        .with_context(|| format!("Failed to parse solver config JSON '{}'", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid solver config '{}'", path.display()))?;

    Ok(config)
}

/// `--config` first, then `VIBE_SOLVER_CONFIG`, then the defaults.
pub fn resolve_solver_config(explicit: Option<PathBuf>) -> Result<SolverConfig> {
    match config_path(explicit, env::var(SOLVER_CONFIG_PATH_ENV).ok()) {
        Some(path) => {
            info!("Using solver config {}", path.display());
            load_solver_config(&path)
        }
        None => Ok(SolverConfig::default()),
    }
}

/// `<stem>.solved.json`, inside `out_dir` or next to the input.
pub fn solved_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    let file_name = format!("{stem}.solved.json");

    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

#[derive(Debug)]
pub struct SolveOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub solved: SolvedChart,
}

pub fn solve_chart_file(input: &Path, out_dir: Option<&Path>, config: &SolverConfig) -> Result<SolveOutcome> {
    let chart = load_chart_json(input)?;
    let solved = chart
        .solve(config)
        .with_context(|| format!("Failed to solve chart {}", input.display()))?;

    let output = solved_path(input, out_dir);
    save_solved_json(&solved, &output)?;

    info!(
        "Solved '{}' ({} hits): bonus {} -> {}",
        solved.chart.name,
        solved.summary.hit_count,
        solved.plan.total_score,
        output.display()
    );

    Ok(SolveOutcome { input: input.to_path_buf(), output, solved })
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub solved: Vec<SolveOutcome>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

/// Solves all inputs in parallel, reporting in input order.
///
/// Without `keep_going` the first failure is returned as the error.
pub fn solve_chart_files(
    inputs: &[PathBuf],
    out_dir: Option<&Path>,
    config: &SolverConfig,
    keep_going: bool,
) -> Result<BatchReport> {
    if !keep_going {
        let solved = inputs
            .par_iter()
            .map(|input| solve_chart_file(input, out_dir, config))
            .collect::<Result<Vec<_>>>()?;
        return Ok(BatchReport { solved, failed: Vec::new() });
    }

    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| (input, solve_chart_file(input, out_dir, config)))
        .collect();

    let mut report = BatchReport::default();
    for (input, result) in results {
        match result {
            Ok(outcome) => report.solved.push(outcome),
            Err(e) => {
                warn!("Skipping {}: {:#}", input.display(), e);
                report.failed.push((input.clone(), e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_JSON: &str = r#"{
        "name": "Batch",
        "beat_map": { "bpm": 120.0, "beat_divisions": 4 },
        "hits": [
            { "time": 0.0, "beat": 1.0, "end_time": 0.0, "end_beat": 1.0, "score": 0, "grants_charge": true },
            { "time": 2.0, "beat": 5.0, "end_time": 2.0, "end_beat": 5.0, "score": 10 },
            { "time": 6.0, "beat": 13.0, "end_time": 6.0, "end_beat": 13.0, "score": 20 }
        ]
    }"#;

    #[test]
    fn test_config_path_precedence() {
        let explicit = Some(PathBuf::from("cli.json"));
        assert_eq!(config_path(explicit, Some("env.json".into())), Some(PathBuf::from("cli.json")));
        assert_eq!(config_path(None, Some(" env.json ".into())), Some(PathBuf::from("env.json")));
        assert_eq!(config_path(None, Some("   ".into())), None);
        assert_eq!(config_path(None, None), None);
    }

    #[test]
    fn test_load_solver_config_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_solver_config(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{missing:#}").contains("Failed to read solver config"));

        let bad_json = dir.path().join("bad.json");
        fs::write(&bad_json, "{ charge_seconds").unwrap();
        let err = load_solver_config(&bad_json).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "charge_seconds": 0.0 }"#).unwrap();
        let err = load_solver_config(&invalid).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid solver config"));

        let ok = dir.path().join("ok.json");
        fs::write(&ok, r#"{ "hit_window_seconds": 0.1 }"#).unwrap();
        let config = load_solver_config(&ok).unwrap();
        assert_eq!(config.hit_window_seconds, 0.1);
        assert_eq!(config.charge_seconds, SolverConfig::default().charge_seconds);
    }

    #[test]
    fn test_solved_path() {
        let input = Path::new("charts/song_hard.json");
        assert_eq!(solved_path(input, None), PathBuf::from("charts/song_hard.solved.json"));
        assert_eq!(solved_path(input, Some(Path::new("out"))), PathBuf::from("out/song_hard.solved.json"));
    }

    #[test]
    fn test_batch_keep_going() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, CHART_JSON).unwrap();
        fs::write(&bad, "not json").unwrap();

        let inputs = vec![bad.clone(), good.clone()];
        let config = SolverConfig::default();

        assert!(solve_chart_files(&inputs, None, &config, false).is_err());

        let report = solve_chart_files(&inputs, None, &config, true).unwrap();
        assert_eq!(report.solved.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);
        assert_eq!(report.solved[0].solved.plan.total_score, 30);
        assert!(dir.path().join("good.solved.json").exists());
    }
}
