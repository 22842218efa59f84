//! Dynamics model: body tables, state layout and valid ranges
//!
//! Layout: `(... x_i y_i vx_i vy_i ... x_s y_s vx_s vy_s theta_s)`, where
//! `(x_i, y_i)` is the position of koule `i`, `(vx_i, vy_i)` its velocity,
//! `(x_s, y_s)` the position of the ship, `(vx_s, vy_s)` its velocity and
//! `theta_s` its orientation.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::Rng;

use super::params::KoulesParams;
use crate::common::{
    signed_so2_distance, KoulesError, KoulesResult, KoulesState, StateValidityChecker,
};

/// Per-coordinate valid range of the real-valued part of the state
/// (everything except the ship orientation)
#[derive(Debug, Clone, PartialEq)]
pub struct StateBounds {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl StateBounds {
    pub fn contains(&self, values: &[f64]) -> bool {
        self.low
            .iter()
            .zip(self.high.iter())
            .zip(values.iter())
            .all(|((lo, hi), v)| *v >= *lo && *v <= *hi)
    }
}

/// Immutably sized model of one problem instance.
///
/// Built fresh for every level; the number of koules never changes during
/// its lifetime.
#[derive(Debug, Clone)]
pub struct KoulesModel {
    params: KoulesParams,
    num_koules: usize,
    mass: Vec<f64>,
    radius: Vec<f64>,
    bounds: StateBounds,
}

impl KoulesModel {
    pub fn new(num_koules: usize, params: KoulesParams) -> KoulesResult<Self> {
        params.validate()?;

        let mut mass = vec![params.koule_mass; num_koules + 1];
        let mut radius = vec![params.koule_radius; num_koules + 1];
        mass[num_koules] = params.ship_mass;
        radius[num_koules] = params.ship_radius;

        let n = 4 * (num_koules + 1);
        let mut low = Vec::with_capacity(n);
        let mut high = Vec::with_capacity(n);
        let vel = params.velocity_limit;
        for _ in 0..num_koules {
            // koules may graze the boundary from outside
            let (lo, hi) = (-params.koule_radius, params.side_length + params.koule_radius);
            low.extend_from_slice(&[lo, lo, -vel, -vel]);
            high.extend_from_slice(&[hi, hi, vel, vel]);
        }
        let (lo, hi) = (params.ship_radius, params.side_length - params.ship_radius);
        low.extend_from_slice(&[lo, lo, -vel, -vel]);
        high.extend_from_slice(&[hi, hi, vel, vel]);

        Ok(Self {
            params,
            num_koules,
            mass,
            radius,
            bounds: StateBounds { low, high },
        })
    }

    pub fn with_defaults(num_koules: usize) -> KoulesResult<Self> {
        Self::new(num_koules, KoulesParams::default())
    }

    pub fn params(&self) -> &KoulesParams {
        &self.params
    }

    pub fn num_koules(&self) -> usize {
        self.num_koules
    }

    /// Koules plus the ship
    pub fn num_bodies(&self) -> usize {
        self.num_koules + 1
    }

    /// Index of the ship among the bodies
    pub fn ship_index(&self) -> usize {
        self.num_koules
    }

    pub fn mass(&self, i: usize) -> f64 {
        self.mass[i]
    }

    pub fn radius(&self, i: usize) -> f64 {
        self.radius[i]
    }

    /// Length of the flat state vector
    pub fn dimension(&self) -> usize {
        4 * (self.num_koules + 1) + 1
    }

    pub fn bounds(&self) -> &StateBounds {
        &self.bounds
    }

    pub fn zero_state(&self) -> KoulesState {
        KoulesState::zeros(self.num_koules)
    }

    /// Build a state from a flat vector of reals
    pub fn state_from_reals(&self, values: &[f64]) -> KoulesResult<KoulesState> {
        if values.len() != self.dimension() {
            return Err(KoulesError::DimensionMismatch {
                expected: self.dimension(),
                actual: values.len(),
            });
        }
        Ok(KoulesState::from_vec(values.to_vec()))
    }

    pub fn satisfies_bounds(&self, state: &KoulesState) -> bool {
        let values = state.as_slice();
        if values.len() != self.dimension() {
            return false;
        }
        let theta = state.ship_orientation();
        self.bounds.contains(&values[..values.len() - 1]) && (-PI..=PI).contains(&theta)
    }

    /// Distance between two states: Euclidean over the real-valued part plus
    /// half the absolute orientation difference
    pub fn distance(&self, a: &KoulesState, b: &KoulesState) -> f64 {
        let (a, b) = (a.as_slice(), b.as_slice());
        let n = a.len() - 1;
        let linear = a[..n]
            .iter()
            .zip(b[..n].iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt();
        linear + 0.5 * signed_so2_distance(a[n], b[n]).abs()
    }

    /// Overwrite `state` with a state drawn uniformly from the bounds
    pub fn sample_uniform_state<R: Rng + ?Sized>(&self, rng: &mut R, state: &mut KoulesState) {
        let values = state.as_mut_slice();
        let n = self.bounds.low.len();
        for (j, value) in values.iter_mut().take(n).enumerate() {
            *value = rng.gen_range(self.bounds.low[j]..=self.bounds.high[j]);
        }
        values[n] = rng.gen_range(-PI..PI);
    }
}

/// Validity checker that only tests containment in the model bounds
#[derive(Debug, Clone)]
pub struct BoundsValidityChecker {
    model: Arc<KoulesModel>,
}

impl BoundsValidityChecker {
    pub fn new(model: Arc<KoulesModel>) -> Self {
        Self { model }
    }
}

impl StateValidityChecker for BoundsValidityChecker {
    fn is_valid(&self, state: &KoulesState) -> bool {
        self.model.satisfies_bounds(state)
    }
}
