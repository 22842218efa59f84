//! Solving a full game one level at a time
//!
//! Each level is planned with the time left over from the previous ones.
//! When a level ends with some koules pushed out, the survivors make up the
//! next level's problem.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use super::control_path::ControlPath;
use super::registry::PlannerRegistry;
use super::PlannerSolution;
use crate::common::{KoulesError, KoulesResult, KoulesState};
use crate::koules::{next_level, KoulesModel, KoulesStatePropagator};

/// Interpolated path for one level
#[derive(Debug, Clone)]
pub struct LevelSolution {
    /// Koules present when the level started
    pub num_koules: usize,
    pub path: ControlPath,
    pub exact: bool,
}

/// Plan a single level with the planner registered as `planner_name`
pub fn solve_one_level(
    registry: &PlannerRegistry,
    planner_name: &str,
    model: Arc<KoulesModel>,
    start: &KoulesState,
    time_budget: f64,
    seed: u64,
) -> KoulesResult<PlannerSolution> {
    let mut planner = registry.create(planner_name, model.clone(), seed)?;
    info!(
        "Planning for {} koules with {} ({:.2}s)",
        model.num_koules(),
        planner.name(),
        time_budget
    );
    let solution = planner.solve(start, time_budget)?;
    if solution.exact {
        info!("Solution found for {} koules", model.num_koules());
    } else {
        info!(
            "Approximate solution found for {} koules (goal distance {:.4})",
            model.num_koules(),
            solution.goal_distance
        );
    }
    Ok(solution)
}

/// Plan level after level until every koule is gone, time runs out or a
/// level only yields an approximate solution.
///
/// Returns the interpolated level paths in execution order. The last entry
/// is approximate when the game was not finished.
pub fn solve_all_levels(
    registry: &PlannerRegistry,
    planner_name: &str,
    model: Arc<KoulesModel>,
    start: &KoulesState,
    max_time: f64,
    seed: u64,
) -> KoulesResult<Vec<LevelSolution>> {
    let started = Instant::now();
    let mut levels = Vec::new();
    let mut model = model;
    let mut start = start.clone();
    let mut level_seed = seed;

    loop {
        let remaining = max_time - started.elapsed().as_secs_f64();
        if remaining <= 0.0 {
            warn!(
                "Out of time with {} koules left after {} levels",
                model.num_koules(),
                levels.len()
            );
            break;
        }

        let solution = solve_one_level(
            registry,
            planner_name,
            model.clone(),
            &start,
            remaining,
            level_seed,
        )?;
        level_seed = level_seed.wrapping_add(1);

        let mut path = solution.path;
        let mut propagator = KoulesStatePropagator::new(model.clone());
        path.interpolate(&mut propagator);
        let final_state = path.final_state().clone();
        levels.push(LevelSolution {
            num_koules: model.num_koules(),
            path,
            exact: solution.exact,
        });

        if !solution.exact {
            break;
        }
        match next_level(&model, &final_state)? {
            Some((next_model, next_start)) => {
                if next_model.num_koules() == 0 {
                    break;
                }
                model = next_model;
                start = next_start;
            }
            None => {
                return Err(KoulesError::PlanningError(format!(
                    "goal reached with {} koules but none left the workspace",
                    model.num_koules()
                )));
            }
        }
    }
    Ok(levels)
}
