//! Koules planning driver
//!
//! Plans one level (`plan`) or all levels (`plan-all`) and writes the
//! interpolated path as a plain-text matrix.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use koules_dynamics::koules::{
    default_start_state, randomize_koule_velocities, BoundsValidityChecker, KoulesModel,
    KoulesStatePropagator,
};
use koules_dynamics::path_planning::{solve_all_levels, solve_one_level, PlannerRegistry};
use koules_dynamics::utils::read_matrix;
use koules_dynamics::KoulesState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan ship motions that clear koules from the workspace")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan one level of koules
    Plan(PlanArgs),
    /// Plan all levels of koules
    PlanAll(PlanArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Number of koules
    #[arg(long, default_value_t = 3)]
    num_koules: usize,
    /// Planning time budget [s]
    #[arg(long, default_value_t = 10.0)]
    max_time: f64,
    /// Output file (derived from the other options when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Planner name (rrt, est)
    #[arg(long, default_value = "rrt")]
    planner: String,
    /// Initial koule speed in a random direction
    #[arg(long, default_value_t = 0.0)]
    velocity: f64,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Matrix file whose last row holds the start state
    #[arg(long)]
    start: Option<PathBuf>,
}

fn default_output(args: &PlanArgs, all_levels: bool) -> PathBuf {
    let koules = if all_levels {
        format!("1-{}", args.num_koules)
    } else {
        args.num_koules.to_string()
    };
    PathBuf::from(format!(
        "koules_{}_{}_{}.dat",
        koules, args.planner, args.max_time
    ))
}

fn start_state(model: &KoulesModel, args: &PlanArgs) -> Result<KoulesState> {
    if let Some(path) = &args.start {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let rows = read_matrix(BufReader::new(file))?;
        let last = match rows.last() {
            Some(row) if row.len() >= model.dimension() => row,
            _ => bail!(
                "{} has no row with {} values",
                path.display(),
                model.dimension()
            ),
        };
        let state = model.state_from_reals(&last[..model.dimension()])?;
        if !model.satisfies_bounds(&state) {
            bail!("start state from {} is out of bounds", path.display());
        }
        return Ok(state);
    }

    let mut state = default_start_state(model);
    if args.velocity > 0.0 {
        let mut rng = StdRng::seed_from_u64(args.seed);
        randomize_koule_velocities(&mut state, args.velocity, &mut rng);
    }
    Ok(state)
}

fn run(args: PlanArgs, all_levels: bool) -> Result<()> {
    let model = Arc::new(KoulesModel::with_defaults(args.num_koules)?);
    let start = start_state(&model, &args)?;
    let registry = PlannerRegistry::new();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args, all_levels));

    let paths = if all_levels {
        let levels = solve_all_levels(
            &registry,
            &args.planner,
            model.clone(),
            &start,
            args.max_time,
            args.seed,
        )?;
        if levels.is_empty() {
            error!("No level was solved");
            return Ok(());
        }
        levels.into_iter().map(|l| l.path).collect::<Vec<_>>()
    } else {
        let solution = solve_one_level(
            &registry,
            &args.planner,
            model.clone(),
            &start,
            args.max_time,
            args.seed,
        )?;
        let mut path = solution.path;
        let mut propagator = KoulesStatePropagator::new(model.clone());
        path.interpolate(&mut propagator);
        if !path.check(&BoundsValidityChecker::new(model.clone())) {
            error!("Path is invalid");
        }
        vec![path]
    };

    let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    let mut out = BufWriter::new(file);
    for path in &paths {
        path.print_as_matrix(&mut out)?;
    }
    out.flush()?;
    info!("Output saved in {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => run(args, false),
        Command::PlanAll(args) => run(args, true),
    }
}
