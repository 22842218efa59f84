//! Kinodynamic RRT (Rapidly-exploring Random Tree)
//!
//! Grows a tree of states connected by controls. Each iteration samples a
//! random state (or, with a small probability, a goal state), finds the
//! nearest tree node and extends it toward the sample with the directed
//! control sampler.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::control_path::{ControlPath, Motion};
use super::PlannerSolution;
use crate::common::{
    DirectedControlSampler, GoalRegion, KoulesError, KoulesResult, KoulesState, Planner,
};
use crate::koules::{KoulesDirectedControlSampler, KoulesGoal, KoulesModel};

/// Configuration for the control RRT planner
#[derive(Debug, Clone)]
pub struct RRTConfig {
    /// Probability of extending toward a goal sample
    pub goal_bias: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Hold each control for the maximum number of steps
    pub propagate_max: bool,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            goal_bias: 0.05,
            max_iter: usize::MAX,
            propagate_max: false,
        }
    }
}

/// Control RRT planner
pub struct ControlRRT {
    model: Arc<KoulesModel>,
    config: RRTConfig,
    directed: KoulesDirectedControlSampler,
    goal: KoulesGoal,
    rng: StdRng,
    tree: Vec<Motion>,
}

impl ControlRRT {
    pub fn new(model: Arc<KoulesModel>, config: RRTConfig, seed: u64) -> Self {
        ControlRRT {
            directed: KoulesDirectedControlSampler::with_defaults(
                model.clone(),
                config.propagate_max,
                seed,
            ),
            goal: KoulesGoal::with_seed(model.clone(), seed.wrapping_add(2)),
            rng: StdRng::seed_from_u64(seed.wrapping_add(3)),
            tree: Vec::new(),
            model,
            config,
        }
    }

    pub fn with_defaults(model: Arc<KoulesModel>, seed: u64) -> Self {
        Self::new(model, RRTConfig::default(), seed)
    }

    /// Get the tree built during planning
    pub fn get_tree(&self) -> &[Motion] {
        &self.tree
    }

    fn get_nearest_node_index(&self, target: &KoulesState) -> usize {
        self.tree
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| OrderedFloat(self.model.distance(&m.state, target)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

impl Planner for ControlRRT {
    fn name(&self) -> &str {
        "rrt"
    }

    fn solve(&mut self, start: &KoulesState, time_budget: f64) -> KoulesResult<PlannerSolution> {
        if !self.model.satisfies_bounds(start) {
            return Err(KoulesError::PlanningError(
                "RRT: start state is invalid".to_string(),
            ));
        }
        let started = Instant::now();
        let min_steps = self.model.params().min_control_steps;

        self.tree.clear();
        self.tree.push(Motion::root(start.clone()));

        let mut best = 0;
        let mut best_dist = self.goal.distance_goal(start);
        let mut solved = self.goal.is_satisfied(start);
        let mut goal_samples = 0;
        let mut sample = self.model.zero_state();

        let mut iter = 0;
        while !solved && iter < self.config.max_iter && started.elapsed().as_secs_f64() < time_budget {
            iter += 1;

            if goal_samples < self.goal.max_sample_count() && self.rng.gen_bool(self.config.goal_bias) {
                self.goal.sample_goal(&mut sample);
                goal_samples += 1;
            } else {
                self.model.sample_uniform_state(&mut self.rng, &mut sample);
            }

            let nearest = self.get_nearest_node_index(&sample);
            let source = self.tree[nearest].state.clone();
            let out = self.directed.sample_to(&source, &mut sample);
            if out.steps < min_steps {
                continue;
            }

            let dist = self.goal.distance_goal(&sample);
            self.tree.push(Motion {
                state: sample.clone(),
                control: out.control,
                steps: out.steps,
                parent: Some(nearest),
            });
            if dist < best_dist {
                best_dist = dist;
                best = self.tree.len() - 1;
                debug!("RRT: goal distance {:.4} after {} iterations", dist, iter);
            }
            solved = dist <= 0.0;
        }

        info!(
            "RRT: {} states in tree after {} iterations ({:.2}s, propagate_max={}), {} solution",
            self.tree.len(),
            iter,
            started.elapsed().as_secs_f64(),
            self.directed.propagate_max(),
            if solved { "exact" } else { "approximate" }
        );

        Ok(PlannerSolution {
            path: ControlPath::from_tree(&self.tree, best, self.model.params().propagation_step),
            exact: solved,
            goal_distance: best_dist,
        })
    }
}
