//! Common types used throughout koules_dynamics

use std::f64::consts::PI;

use nalgebra::Vector2;

/// Ship control: the target velocity the ship's thrust law tries to attain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub vx: f64,
    pub vy: f64,
}

impl Control {
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    pub fn zero() -> Self {
        Self { vx: 0.0, vy: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.vx, self.vy)
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Vector2<f64>> for Control {
    fn from(v: Vector2<f64>) -> Self {
        Self { vx: v[0], vy: v[1] }
    }
}

/// Flat system state.
///
/// Layout: `(x_i, y_i, vx_i, vy_i)` for every koule `i` in index order,
/// followed by the ship's `(x, y, vx, vy, theta)`. The length is always
/// `4 * (num_koules + 1) + 1`; the model is responsible for building states
/// of the right size.
#[derive(Debug, Clone, PartialEq)]
pub struct KoulesState {
    values: Vec<f64>,
}

impl KoulesState {
    /// All-zero state for a world with `num_koules` koules
    pub fn zeros(num_koules: usize) -> Self {
        Self {
            values: vec![0.0; 4 * (num_koules + 1) + 1],
        }
    }

    pub(crate) fn from_vec(values: Vec<f64>) -> Self {
        debug_assert!(values.len() >= 5 && (values.len() - 5) % 4 == 0);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn num_koules(&self) -> usize {
        (self.values.len() - 5) / 4
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Copy the state into a plain vector of reals
    pub fn to_reals(&self) -> Vec<f64> {
        self.values.clone()
    }

    pub fn copy_from(&mut self, other: &KoulesState) {
        self.values.copy_from_slice(&other.values);
    }

    /// Position of body `i`; the ship is body `num_koules()`
    pub fn body_position(&self, i: usize) -> Vector2<f64> {
        Vector2::new(self.values[4 * i], self.values[4 * i + 1])
    }

    pub fn body_velocity(&self, i: usize) -> Vector2<f64> {
        Vector2::new(self.values[4 * i + 2], self.values[4 * i + 3])
    }

    pub fn set_body_position(&mut self, i: usize, x: f64, y: f64) {
        self.values[4 * i] = x;
        self.values[4 * i + 1] = y;
    }

    pub fn set_body_velocity(&mut self, i: usize, vx: f64, vy: f64) {
        self.values[4 * i + 2] = vx;
        self.values[4 * i + 3] = vy;
    }

    fn ship_offset(&self) -> usize {
        self.values.len() - 5
    }

    pub fn ship_position(&self) -> Vector2<f64> {
        let o = self.ship_offset();
        Vector2::new(self.values[o], self.values[o + 1])
    }

    pub fn ship_velocity(&self) -> Vector2<f64> {
        let o = self.ship_offset();
        Vector2::new(self.values[o + 2], self.values[o + 3])
    }

    pub fn ship_orientation(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn set_ship_position(&mut self, x: f64, y: f64) {
        let o = self.ship_offset();
        self.values[o] = x;
        self.values[o + 1] = y;
    }

    pub fn set_ship_velocity(&mut self, vx: f64, vy: f64) {
        let o = self.ship_offset();
        self.values[o + 2] = vx;
        self.values[o + 3] = vy;
    }

    pub fn set_ship_orientation(&mut self, theta: f64) {
        let last = self.values.len() - 1;
        self.values[last] = theta;
    }
}

/// Normalize angle to (-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a - 2.0 * PI
    } else {
        a
    }
}

/// Signed shortest rotation from `y` to `x` on the circle.
/// Both arguments must already lie in [-PI, PI].
pub fn signed_so2_distance(x: f64, y: f64) -> f64 {
    let d = x - y;
    if d < -PI {
        d + 2.0 * PI
    } else if d > PI {
        d - 2.0 * PI
    } else {
        d
    }
}
