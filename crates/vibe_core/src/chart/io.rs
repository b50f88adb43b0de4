use super::{ChartDocument, SolvedChart};
use crate::SCHEMA_VERSION;
use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

/// Parse a chart document from JSON text
pub fn parse_chart_json(json: &str) -> anyhow::Result<ChartDocument> {
    let chart: ChartDocument = serde_json::from_str(json).context("Invalid chart JSON")?;

    if chart.schema_version != SCHEMA_VERSION {
        bail!(
            "Unsupported chart schema version {} (expected {})",
            chart.schema_version,
            SCHEMA_VERSION
        );
    }

    Ok(chart)
}

/// Load a chart document from a JSON file
pub fn load_chart_json<P: AsRef<Path>>(path: P) -> anyhow::Result<ChartDocument> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart file {}", path.display()))?;

    parse_chart_json(&data).with_context(|| format!("Failed to load chart {}", path.display()))
}

/// Save a solved chart as pretty JSON
pub fn save_solved_json<P: AsRef<Path>>(solved: &SolvedChart, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(solved)?;
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load a solved chart written by [`save_solved_json`]
pub fn load_solved_json<P: AsRef<Path>>(path: P) -> anyhow::Result<SolvedChart> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read solved chart {}", path.display()))?;
    let solved: SolvedChart = serde_json::from_str(&data)
        .with_context(|| format!("Invalid solved chart JSON in {}", path.display()))?;

    if solved.schema_version != SCHEMA_VERSION {
        bail!("Unsupported solved chart schema version {}", solved.schema_version);
    }

    Ok(solved)
}
