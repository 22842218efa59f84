//! Common traits defining the interface between the dynamics core and the
//! planners that drive it

use nalgebra::DVector;

use crate::common::error::KoulesResult;
use crate::common::types::*;
use crate::path_planning::PlannerSolution;

/// Forward dynamics: integrate `start` under `control` for `duration`.
///
/// Implementations may keep scratch space, hence `&mut self`; use one
/// propagator per worker thread.
pub trait StatePropagator {
    /// Always succeeds. The result may lie outside the valid bounds; judging
    /// that is left to a [`StateValidityChecker`].
    fn propagate(
        &mut self,
        start: &KoulesState,
        control: &Control,
        duration: f64,
        result: &mut KoulesState,
    );
}

/// Trait for control samplers
pub trait ControlSampler {
    /// Sample a control for the given state
    fn sample(&mut self, state: &KoulesState) -> Control;

    /// Sample a control that follows `previous`
    fn sample_next(&mut self, _previous: &Control, state: &KoulesState) -> Control {
        self.sample(state)
    }

    /// Control pointing the ship toward the workspace point `(x, y)`
    fn steer(&mut self, state: &KoulesState, x: f64, y: f64) -> Control;

    /// Number of propagation steps, uniform in `[min, max]`
    fn sample_step_count(&mut self, min: usize, max: usize) -> usize;
}

/// Result of directed control sampling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedSample {
    /// Control applied on every step
    pub control: Control,
    /// Number of valid propagation steps; 0 means the first step was invalid
    pub steps: usize,
}

/// Trait for samplers that try to connect a source state toward a destination
pub trait DirectedControlSampler {
    /// On return `dest` holds the last valid state reached (or `source` when
    /// `steps == 0`).
    fn sample_to(&mut self, source: &KoulesState, dest: &mut KoulesState) -> DirectedSample;
}

/// Trait for sampleable goal regions
pub trait GoalRegion {
    /// Distance to the goal region; zero inside it
    fn distance_goal(&self, state: &KoulesState) -> f64;

    fn is_satisfied(&self, state: &KoulesState) -> bool {
        self.distance_goal(state) <= 0.0
    }

    /// Overwrite `state` with a random state inside the goal region
    fn sample_goal(&mut self, state: &mut KoulesState);

    /// Maximum number of goal samples a planner should draw
    fn max_sample_count(&self) -> usize;
}

/// Trait for state validity checking
pub trait StateValidityChecker {
    fn is_valid(&self, state: &KoulesState) -> bool;
}

/// Trait for low-dimensional projections used for spatial bucketing
pub trait ProjectionEvaluator {
    fn dimension(&self) -> usize;

    fn project(&self, state: &KoulesState) -> DVector<f64>;

    /// Default grid cell size along each projected axis
    fn default_cell_sizes(&self) -> Vec<f64>;
}

/// Trait for kinodynamic planners
pub trait Planner {
    /// Short name the planner is registered under
    fn name(&self) -> &str;

    /// Plan from `start` until the goal is reached or `time_budget` seconds pass
    fn solve(&mut self, start: &KoulesState, time_budget: f64) -> KoulesResult<PlannerSolution>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EdgeGoal;

    impl GoalRegion for EdgeGoal {
        fn distance_goal(&self, state: &KoulesState) -> f64 {
            state.as_slice()[0].max(0.0)
        }

        fn sample_goal(&mut self, state: &mut KoulesState) {
            state.as_mut_slice()[0] = 0.0;
        }

        fn max_sample_count(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_goal_region_default_is_satisfied() {
        let goal = EdgeGoal;
        let mut s = KoulesState::zeros(1);
        assert!(goal.is_satisfied(&s));
        s.as_mut_slice()[0] = 0.3;
        assert!(!goal.is_satisfied(&s));
    }
}
