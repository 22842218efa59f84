//! Kinodynamic EST (Expansive Space Trees)
//!
//! Motions are bucketed into a grid over a low-dimensional projection of the
//! state. Each iteration picks a cell with probability inversely proportional
//! to how many motions it holds, picks a motion in it, and extends it with a
//! random control for a random number of steps, stopping at the first invalid
//! state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::control_path::{ControlPath, Motion};
use super::PlannerSolution;
use crate::common::{
    Control, ControlSampler, GoalRegion, KoulesError, KoulesResult, KoulesState, Planner,
    ProjectionEvaluator, StatePropagator, StateValidityChecker,
};
use crate::koules::{
    BoundsValidityChecker, KoulesControlSampler, KoulesGoal, KoulesModel, KoulesProjection,
    KoulesStatePropagator,
};

/// Configuration for the EST planner
#[derive(Debug, Clone)]
pub struct ESTConfig {
    /// Requested projection dimension (clipped by the projection)
    pub projection_dimension: usize,
    /// Maximum iterations
    pub max_iter: usize,
}

impl Default for ESTConfig {
    fn default() -> Self {
        Self {
            projection_dimension: 3,
            max_iter: usize::MAX,
        }
    }
}

/// Grid of motion indices keyed by projected cell coordinates
#[derive(Debug, Default)]
struct Grid {
    cells: Vec<Vec<usize>>,
    index: HashMap<Vec<i64>, usize>,
}

impl Grid {
    fn add(&mut self, key: Vec<i64>, motion: usize) {
        match self.index.get(&key) {
            Some(&c) => self.cells[c].push(motion),
            None => {
                self.index.insert(key, self.cells.len());
                self.cells.push(vec![motion]);
            }
        }
    }

    /// Cell chosen with weight `1 / motions in cell`
    fn sample_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> &[usize] {
        let total: f64 = self.cells.iter().map(|c| 1.0 / c.len() as f64).sum();
        let mut r = rng.gen_range(0.0..total);
        for cell in &self.cells {
            let w = 1.0 / cell.len() as f64;
            if r < w {
                return cell;
            }
            r -= w;
        }
        &self.cells[self.cells.len() - 1]
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.index.clear();
    }
}

/// EST planner
pub struct EST {
    model: Arc<KoulesModel>,
    config: ESTConfig,
    projection: KoulesProjection,
    cell_sizes: Vec<f64>,
    control_sampler: KoulesControlSampler,
    propagator: KoulesStatePropagator,
    validity: BoundsValidityChecker,
    goal: KoulesGoal,
    rng: StdRng,
    tree: Vec<Motion>,
    grid: Grid,
}

impl EST {
    pub fn new(model: Arc<KoulesModel>, config: ESTConfig, seed: u64) -> Self {
        let projection = KoulesProjection::new(&model, config.projection_dimension);
        EST {
            cell_sizes: projection.default_cell_sizes(),
            projection,
            control_sampler: KoulesControlSampler::with_seed(model.clone(), seed),
            propagator: KoulesStatePropagator::new(model.clone()),
            validity: BoundsValidityChecker::new(model.clone()),
            goal: KoulesGoal::with_seed(model.clone(), seed.wrapping_add(1)),
            rng: StdRng::seed_from_u64(seed.wrapping_add(2)),
            tree: Vec::new(),
            grid: Grid::default(),
            model,
            config,
        }
    }

    pub fn with_defaults(model: Arc<KoulesModel>, seed: u64) -> Self {
        Self::new(model, ESTConfig::default(), seed)
    }

    /// Get the tree built during planning
    pub fn get_tree(&self) -> &[Motion] {
        &self.tree
    }

    fn cell_key(&self, state: &KoulesState) -> Vec<i64> {
        self.projection
            .project(state)
            .iter()
            .zip(self.cell_sizes.iter())
            .map(|(x, size)| (x / size).floor() as i64)
            .collect()
    }

    fn add_motion(&mut self, motion: Motion) {
        let key = self.cell_key(&motion.state);
        self.tree.push(motion);
        self.grid.add(key, self.tree.len() - 1);
    }

    /// Propagate step by step while states stay valid; returns the number of
    /// valid steps and leaves the last valid state in `result`
    fn propagate_while_valid(
        &mut self,
        source: &KoulesState,
        control: &Control,
        steps: usize,
        result: &mut KoulesState,
    ) -> usize {
        let step = self.model.params().propagation_step;
        let mut current = source.clone();
        for i in 0..steps {
            self.propagator.propagate(&current, control, step, result);
            if !self.validity.is_valid(result) {
                result.copy_from(&current);
                return i;
            }
            current.copy_from(result);
        }
        steps
    }
}

impl Planner for EST {
    fn name(&self) -> &str {
        "est"
    }

    fn solve(&mut self, start: &KoulesState, time_budget: f64) -> KoulesResult<PlannerSolution> {
        if !self.validity.is_valid(start) {
            return Err(KoulesError::PlanningError(
                "EST: start state is invalid".to_string(),
            ));
        }
        let started = Instant::now();
        let (min_steps, max_steps) = {
            let p = self.model.params();
            (p.min_control_steps, p.max_control_steps)
        };

        self.tree.clear();
        self.grid.clear();
        self.add_motion(Motion::root(start.clone()));

        let mut best = 0;
        let mut best_dist = self.goal.distance_goal(start);
        let mut solved = self.goal.is_satisfied(start);
        let mut result = self.model.zero_state();

        let mut iter = 0;
        while !solved && iter < self.config.max_iter && started.elapsed().as_secs_f64() < time_budget {
            iter += 1;

            let cell = self.grid.sample_cell(&mut self.rng);
            let existing = cell[self.rng.gen_range(0..cell.len())];
            let source = self.tree[existing].state.clone();
            let previous = self.tree[existing].control;

            let control = self.control_sampler.sample_next(&previous, &source);
            let steps = self.control_sampler.sample_step_count(min_steps, max_steps);
            let steps = self.propagate_while_valid(&source, &control, steps, &mut result);
            if steps < min_steps {
                continue;
            }

            let dist = self.goal.distance_goal(&result);
            self.add_motion(Motion {
                state: result.clone(),
                control,
                steps,
                parent: Some(existing),
            });
            if dist < best_dist {
                best_dist = dist;
                best = self.tree.len() - 1;
                debug!("EST: goal distance {:.4} after {} iterations", dist, iter);
            }
            solved = dist <= 0.0;
        }

        info!(
            "EST: {} states in {} cells after {} iterations ({:.2}s), {} solution",
            self.tree.len(),
            self.grid.cells.len(),
            iter,
            started.elapsed().as_secs_f64(),
            if solved { "exact" } else { "approximate" }
        );

        Ok(PlannerSolution {
            path: ControlPath::from_tree(&self.tree, best, self.model.params().propagation_step),
            exact: solved,
            goal_distance: best_dist,
        })
    }
}
