//! Vibe CLI
//!
//! Solves captured chart JSON files for their optimal power activations.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use vibe_core::{Activation, SolvedChart, Tier, TierPlan};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "vibe")]
#[command(about = "Find score-optimal power activations for rhythm game charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Solve chart JSON files and write <name>.solved.json for each
    Solve {
        /// Chart JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: next to each input)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Solver config JSON (overrides VIBE_SOLVER_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log failing charts and continue with the rest
        #[arg(long)]
        keep_going: bool,
    },

    /// Print a chart's scores and its optimal activations
    Summary {
        /// Chart JSON file
        input: PathBuf,

        /// Solver config JSON (overrides VIBE_SOLVER_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the activation obtained by starting at a given time
    Lookup {
        /// Chart JSON file
        input: PathBuf,

        /// Activation start time in seconds
        #[arg(long, allow_hyphen_values = true)]
        time: f64,

        #[arg(long, value_enum, default_value = "single")]
        tier: TierArg,

        /// Solver config JSON (overrides VIBE_SOLVER_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Single,
    Double,
}

#[cfg(feature = "cli")]
impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Single => Tier::Single,
            TierArg::Double => Tier::Double,
        }
    }
}

#[cfg(feature = "cli")]
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { inputs, out, config, keep_going } => {
            let config = vibe_cli::resolve_solver_config(config)?;

            if let Some(dir) = &out {
                std::fs::create_dir_all(dir)?;
            }

            println!("🎵 Solving {} chart(s)...", inputs.len());

            let report = vibe_cli::solve_chart_files(&inputs, out.as_deref(), &config, keep_going)?;

            for outcome in &report.solved {
                println!(
                    "   ✅ {} → {} (bonus {})",
                    outcome.input.display(),
                    outcome.output.display(),
                    outcome.solved.plan.total_score
                );
            }
            for (input, e) in &report.failed {
                println!("   ❌ {}: {:#}", input.display(), e);
            }

            println!("\n{} solved, {} failed", report.solved.len(), report.failed.len());

            if !report.failed.is_empty() && report.solved.is_empty() {
                anyhow::bail!("❌ No chart could be solved");
            }
        }

        Commands::Summary { input, config } => {
            let solved = solve_one(input, config)?;
            print_summary(&solved);
        }

        Commands::Lookup { input, time, tier, config } => {
            let solved = solve_one(input, config)?;
            let tier = Tier::from(tier);
            let plan = solved.plan.tier(tier);

            match plan.activation_at(time) {
                Some((index, activation)) => {
                    println!("🔍 {:?} activation #{} at {:.3}s", tier, index, time);
                    print_activation(activation, plan.is_optimal(index));
                }
                None => println!("🔍 No {:?} activation can start at {:.3}s", tier, time),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn solve_one(input: PathBuf, config: Option<PathBuf>) -> Result<SolvedChart> {
    let config = vibe_cli::resolve_solver_config(config)?;
    let chart = vibe_core::chart::io::load_chart_json(&input)?;
    Ok(chart.solve(&config)?)
}

#[cfg(feature = "cli")]
fn print_summary(solved: &SolvedChart) {
    let chart = &solved.chart;
    let summary = &solved.summary;

    println!("🎵 {} [{}]", chart.name, chart.difficulty);
    println!("   Hits:            {} ({} charges)", summary.hit_count, summary.charge_count);
    println!("   Max combo:       {}", summary.max_combo);
    println!("   Max base score:  {}", summary.max_base_score);
    println!("   Max power bonus: {}", solved.plan.total_score);
    println!("   Max total score: {}", solved.max_total_score());

    print_tier(&solved.plan.single);
    print_tier(&solved.plan.double);
}

#[cfg(feature = "cli")]
fn print_tier(plan: &TierPlan) {
    println!(
        "\n⚡ {:?}: {} activations, {} optimal",
        plan.tier(),
        plan.len(),
        plan.optimal_indices().len()
    );
    for activation in plan.optimal_activations() {
        print_activation(activation, true);
    }
}

#[cfg(feature = "cli")]
fn print_activation(activation: &Activation, optimal: bool) {
    println!(
        "   {} start {:.3}s..{:.3}s (beat {:.2}..{:.2}), last hit {:.3}s, score {}",
        if optimal { "★" } else { " " },
        activation.min_start_time,
        activation.max_start_time,
        activation.min_start_beat,
        activation.max_start_beat,
        activation.last_hit_time,
        activation.score
    );
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("vibe CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
