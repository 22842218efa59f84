//! Goal region: some koule has reached an edge of the workspace

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::KoulesModel;
use crate::common::{GoalRegion, KoulesState};

/// Sampleable goal region for the Koules model
#[derive(Debug, Clone)]
pub struct KoulesGoal {
    model: Arc<KoulesModel>,
    threshold: f64,
    rng: StdRng,
}

impl KoulesGoal {
    pub fn new(model: Arc<KoulesModel>) -> Self {
        Self {
            threshold: model.params().goal_threshold,
            model,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(model: Arc<KoulesModel>, seed: u64) -> Self {
        Self {
            threshold: model.params().goal_threshold,
            model,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl GoalRegion for KoulesGoal {
    /// Shortest distance between any koule and an edge, less the koule radius,
    /// plus the threshold; clamped at zero
    fn distance_goal(&self, state: &KoulesState) -> f64 {
        let params = self.model.params();
        let side = params.side_length;
        let mut min_dist = side;
        for i in 0..self.model.num_koules() {
            let p = state.body_position(i);
            let to_edge = p.x.min(side - p.x).min(p.y).min(side - p.y);
            min_dist = min_dist.min(to_edge - params.koule_radius + self.threshold);
        }
        min_dist.max(0.0)
    }

    /// Uniform state with every koule pinned to a random edge
    fn sample_goal(&mut self, state: &mut KoulesState) {
        let side = self.model.params().side_length;
        self.model.sample_uniform_state(&mut self.rng, state);
        for i in 0..self.model.num_koules() {
            let edge = if self.rng.gen_bool(0.5) { 0.0 } else { side };
            let along = self.rng.gen_range(0.0..=side);
            if self.rng.gen_bool(0.5) {
                state.set_body_position(i, edge, along);
            } else {
                state.set_body_position(i, along, edge);
            }
        }
    }

    fn max_sample_count(&self) -> usize {
        self.model.params().max_goal_samples
    }
}
