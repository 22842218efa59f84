//! Directed control sampler.
//!
//! Steers the ship toward the position stored in the destination state and
//! keeps propagating with that control until the goal is reached, the state
//! becomes invalid, or the step budget runs out.

use std::sync::Arc;

use super::control_sampler::KoulesControlSampler;
use super::goal::KoulesGoal;
use super::model::{BoundsValidityChecker, KoulesModel};
use super::propagator::KoulesStatePropagator;
use crate::common::{
    ControlSampler, DirectedControlSampler, DirectedSample, GoalRegion, KoulesState,
    StatePropagator, StateValidityChecker,
};

pub struct KoulesDirectedControlSampler<G = KoulesGoal, V = BoundsValidityChecker> {
    model: Arc<KoulesModel>,
    control_sampler: KoulesControlSampler,
    propagator: KoulesStatePropagator,
    goal: G,
    validity: V,
    /// Use the maximum step budget instead of a sampled one
    propagate_max: bool,
    current: KoulesState,
    next: KoulesState,
}

impl KoulesDirectedControlSampler {
    /// Sampler with the default goal and bounds-only validity
    pub fn with_defaults(model: Arc<KoulesModel>, propagate_max: bool, seed: u64) -> Self {
        let goal = KoulesGoal::with_seed(model.clone(), seed.wrapping_add(1));
        let validity = BoundsValidityChecker::new(model.clone());
        let control_sampler = KoulesControlSampler::with_seed(model.clone(), seed);
        Self::new(model, control_sampler, goal, validity, propagate_max)
    }
}

impl<G: GoalRegion, V: StateValidityChecker> KoulesDirectedControlSampler<G, V> {
    pub fn new(
        model: Arc<KoulesModel>,
        control_sampler: KoulesControlSampler,
        goal: G,
        validity: V,
        propagate_max: bool,
    ) -> Self {
        Self {
            propagator: KoulesStatePropagator::new(model.clone()),
            current: model.zero_state(),
            next: model.zero_state(),
            model,
            control_sampler,
            goal,
            validity,
            propagate_max,
        }
    }

    pub fn propagate_max(&self) -> bool {
        self.propagate_max
    }

    fn step_budget(&mut self) -> usize {
        let params = self.model.params();
        let (min, max) = (params.min_control_steps, params.max_control_steps);
        if self.propagate_max {
            max
        } else {
            self.control_sampler.sample_step_count(min, max)
        }
    }
}

impl<G: GoalRegion, V: StateValidityChecker> DirectedControlSampler
    for KoulesDirectedControlSampler<G, V>
{
    fn sample_to(&mut self, source: &KoulesState, dest: &mut KoulesState) -> DirectedSample {
        let step = self.model.params().propagation_step;
        let budget = self.step_budget();

        let target = dest.ship_position();
        let control = self.control_sampler.steer(source, target.x, target.y);

        self.propagator.propagate(source, &control, step, &mut self.current);
        if self.goal.is_satisfied(&self.current) {
            dest.copy_from(&self.current);
            return DirectedSample { control, steps: 1 };
        }
        if !self.validity.is_valid(&self.current) {
            // the last valid state is the source
            dest.copy_from(source);
            return DirectedSample { control, steps: 0 };
        }

        let mut steps = budget;
        for i in 1..budget {
            self.propagator.propagate(&self.current, &control, step, &mut self.next);
            if self.goal.is_satisfied(&self.next) {
                dest.copy_from(&self.next);
                return DirectedSample { control, steps: i + 1 };
            }
            if self.validity.is_valid(&self.next) {
                std::mem::swap(&mut self.current, &mut self.next);
            } else {
                steps = i;
                break;
            }
        }
        dest.copy_from(&self.current);
        DirectedSample { control, steps }
    }
}
