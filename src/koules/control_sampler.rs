//! Control sampler: target velocities aimed from the ship toward a point

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, UnitCircle};

use super::model::KoulesModel;
use crate::common::{Control, ControlSampler, KoulesState};

/// Samples target velocities with magnitude in `[vmin, vmax]`
#[derive(Debug, Clone)]
pub struct KoulesControlSampler {
    model: Arc<KoulesModel>,
    rng: StdRng,
}

impl KoulesControlSampler {
    pub fn new(model: Arc<KoulesModel>) -> Self {
        Self {
            model,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(model: Arc<KoulesModel>, seed: u64) -> Self {
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample_magnitude(&mut self) -> f64 {
        let params = self.model.params();
        let (vmin, vmax) = (params.ship_vmin(), params.ship_vmax);
        self.rng.gen_range(vmin..=vmax)
    }

    /// Random direction, random magnitude
    pub fn sample_random(&mut self) -> Control {
        let r = self.sample_magnitude();
        let [x, y]: [f64; 2] = UnitCircle.sample(&mut self.rng);
        Control::new(r * x, r * y)
    }
}

impl ControlSampler for KoulesControlSampler {
    /// Steer toward a uniformly random point of the workspace
    fn sample(&mut self, state: &KoulesState) -> Control {
        let side = self.model.params().side_length;
        let x = self.rng.gen_range(0.0..=side);
        let y = self.rng.gen_range(0.0..=side);
        self.steer(state, x, y)
    }

    fn steer(&mut self, state: &KoulesState, x: f64, y: f64) -> Control {
        let d = nalgebra::Vector2::new(x, y) - state.ship_position();
        let norm2 = d.norm_squared();
        if norm2 > f64::from(f32::EPSILON) {
            let v = self.sample_magnitude() / norm2.sqrt();
            Control::from(d * v)
        } else {
            self.sample_random()
        }
    }

    fn sample_step_count(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> KoulesControlSampler {
        let model = Arc::new(KoulesModel::with_defaults(2).unwrap());
        KoulesControlSampler::with_seed(model, 42)
    }

    #[test]
    fn test_steer_points_at_target() {
        let mut cs = sampler();
        let mut s = cs.model.zero_state();
        s.set_ship_position(0.2, 0.3);
        for _ in 0..50 {
            let c = cs.steer(&s, 0.8, 0.3);
            assert!(c.vx > 0.0);
            assert!(c.vy.abs() < 1e-12);
        }
    }

    #[test]
    fn test_magnitudes_within_bounds() {
        let mut cs = sampler();
        let (vmin, vmax) = (cs.model.params().ship_vmin(), cs.model.params().ship_vmax);
        let mut s = cs.model.zero_state();
        s.set_ship_position(0.5, 0.5);
        for _ in 0..500 {
            let m = cs.sample(&s).magnitude();
            assert!(m >= vmin - 1e-12 && m <= vmax + 1e-12);
        }
    }

    #[test]
    fn test_steer_onto_ship_falls_back_to_random_direction() {
        let mut cs = sampler();
        let (vmin, vmax) = (cs.model.params().ship_vmin(), cs.model.params().ship_vmax);
        let mut s = cs.model.zero_state();
        s.set_ship_position(0.4, 0.4);
        let c = cs.steer(&s, 0.4, 0.4);
        assert!(c.vx.is_finite() && c.vy.is_finite());
        assert!(c.magnitude() >= vmin - 1e-12 && c.magnitude() <= vmax + 1e-12);
    }

    #[test]
    fn test_step_count_range() {
        let mut cs = sampler();
        for _ in 0..200 {
            let n = cs.sample_step_count(1, 100);
            assert!((1..=100).contains(&n));
        }
        assert_eq!(cs.sample_step_count(7, 7), 7);
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let model = Arc::new(KoulesModel::with_defaults(1).unwrap());
        let mut a = KoulesControlSampler::with_seed(model.clone(), 5);
        let mut b = KoulesControlSampler::with_seed(model.clone(), 5);
        let s = model.zero_state();
        for _ in 0..10 {
            assert_eq!(a.sample(&s), b.sample(&s));
        }
    }
}
