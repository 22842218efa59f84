//! Physical and propagation parameters of the Koules world

use std::f64::consts::PI;

use crate::common::{KoulesError, KoulesResult};

/// Parameter set for one problem instance.
///
/// Built once and shared by every component through
/// [`KoulesModel`](super::KoulesModel).
#[derive(Debug, Clone, PartialEq)]
pub struct KoulesParams {
    /// Side of the square workspace [0, side] x [0, side]
    pub side_length: f64,
    pub koule_mass: f64,
    pub koule_radius: f64,
    pub ship_mass: f64,
    pub ship_radius: f64,
    /// Linear thrust of the ship
    pub ship_acceleration: f64,
    /// Angular rate of the ship when turning [rad/s]
    pub ship_rotation_rate: f64,
    /// Upper bound of the control magnitude
    pub ship_vmax: f64,
    /// Spring constant pulling koules toward the center
    pub spring_constant: f64,
    /// Velocity damping of koules
    pub damping: f64,
    /// Integrator micro-step [s]
    pub integration_step: f64,
    /// Duration of one planner-level propagation step [s]
    pub propagation_step: f64,
    pub min_control_steps: usize,
    pub max_control_steps: usize,
    /// Bound on every velocity component of a valid state
    pub velocity_limit: f64,
    /// Extra clearance added to the contact distance
    pub collision_delta: f64,
    /// Slack added to the goal distance
    pub goal_threshold: f64,
    pub max_goal_samples: usize,
}

impl Default for KoulesParams {
    fn default() -> Self {
        let ship_acceleration = 1.0;
        Self {
            side_length: 1.0,
            koule_mass: 0.5,
            koule_radius: 0.015,
            ship_mass: 0.75,
            ship_radius: 0.03,
            ship_acceleration,
            ship_rotation_rate: PI,
            ship_vmax: 0.5 / ship_acceleration,
            spring_constant: 4.0,
            damping: 0.05,
            integration_step: 1e-2,
            propagation_step: 0.05,
            min_control_steps: 1,
            max_control_steps: 100,
            velocity_limit: 10.0,
            collision_delta: 1e-5,
            goal_threshold: 0.01,
            max_goal_samples: 100,
        }
    }
}

impl KoulesParams {
    /// Lower bound of the control magnitude
    pub fn ship_vmin(&self) -> f64 {
        0.1 * self.ship_vmax
    }

    /// Velocity error below which the ship stops thrusting
    pub fn ship_delta(&self) -> f64 {
        0.5 * self.ship_acceleration * self.propagation_step
    }

    /// Heading error below which the ship thrusts instead of turning
    pub fn ship_eps(&self) -> f64 {
        0.5 * self.ship_rotation_rate * self.propagation_step
    }

    pub fn center(&self) -> f64 {
        0.5 * self.side_length
    }

    pub fn validate(&self) -> KoulesResult<()> {
        let positive = [
            ("side_length", self.side_length),
            ("koule_mass", self.koule_mass),
            ("koule_radius", self.koule_radius),
            ("ship_mass", self.ship_mass),
            ("ship_radius", self.ship_radius),
            ("ship_acceleration", self.ship_acceleration),
            ("ship_rotation_rate", self.ship_rotation_rate),
            ("ship_vmax", self.ship_vmax),
            ("integration_step", self.integration_step),
            ("propagation_step", self.propagation_step),
            ("velocity_limit", self.velocity_limit),
        ];
        for (name, value) in positive.iter() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(KoulesError::InvalidParameter(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("spring_constant", self.spring_constant),
            ("damping", self.damping),
            ("collision_delta", self.collision_delta),
            ("goal_threshold", self.goal_threshold),
        ];
        for (name, value) in non_negative.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(KoulesError::InvalidParameter(format!(
                    "{} must be non-negative and finite, got {}",
                    name, value
                )));
            }
        }

        if self.min_control_steps == 0 || self.min_control_steps > self.max_control_steps {
            return Err(KoulesError::InvalidParameter(format!(
                "control steps must satisfy 1 <= min <= max, got {}..{}",
                self.min_control_steps, self.max_control_steps
            )));
        }
        if self.max_goal_samples == 0 {
            return Err(KoulesError::InvalidParameter(
                "max_goal_samples must be at least 1".to_string(),
            ));
        }
        if 2.0 * self.ship_radius >= self.side_length {
            return Err(KoulesError::InvalidParameter(
                "ship does not fit in the workspace".to_string(),
            ));
        }
        Ok(())
    }
}
