//! State propagator: bang-bang ship controller, koule spring dynamics,
//! explicit Euler integration with elastic collisions

use std::sync::Arc;

use nalgebra::Vector2;

use super::collision::{collide, Disk};
use super::model::KoulesModel;
use crate::common::{normalize_angle, signed_so2_distance, Control, KoulesState, StatePropagator};

/// Ship actuation held fixed for one `propagate` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipCommand {
    /// Linear acceleration
    pub thrust: Vector2<f64>,
    /// Angular rate
    pub turn_rate: f64,
}

impl ShipCommand {
    pub fn idle() -> Self {
        Self {
            thrust: Vector2::zeros(),
            turn_rate: 0.0,
        }
    }
}

/// Propagator for the Koules model.
///
/// Owns scratch buffers sized once from the model and reused by every call,
/// so `propagate` does not allocate. An instance must not be shared between
/// threads that propagate concurrently; give each worker its own.
#[derive(Debug, Clone)]
pub struct KoulesStatePropagator {
    model: Arc<KoulesModel>,
    time_step: f64,
    q: Vec<f64>,
    qdot: Vec<f64>,
    has_collision: Vec<bool>,
}

impl KoulesStatePropagator {
    pub fn new(model: Arc<KoulesModel>) -> Self {
        let dim = model.dimension();
        let bodies = model.num_bodies();
        Self {
            time_step: model.params().integration_step,
            q: vec![0.0; dim],
            qdot: vec![0.0; dim],
            has_collision: vec![false; bodies],
            model,
        }
    }

    pub fn model(&self) -> &Arc<KoulesModel> {
        &self.model
    }

    /// Bang-bang law driving the ship toward the control's target velocity.
    ///
    /// If the velocity error is small the ship idles. Otherwise it thrusts
    /// along its heading when that heading points close enough along the
    /// error, and turns the short way round at full rate when it does not.
    pub fn ship_command(&self, state: &KoulesState, control: &Control) -> ShipCommand {
        let params = self.model.params();
        let v = control.to_vector() - state.ship_velocity();
        let theta = state.ship_orientation();
        let delta_theta = signed_so2_distance(v.y.atan2(v.x), theta);

        if v.norm_squared() <= params.ship_delta() * params.ship_delta() {
            ShipCommand::idle()
        } else if delta_theta.abs() < params.ship_eps() {
            ShipCommand {
                thrust: Vector2::new(theta.cos(), theta.sin()) * params.ship_acceleration,
                turn_rate: 0.0,
            }
        } else {
            ShipCommand {
                thrust: Vector2::zeros(),
                turn_rate: params.ship_rotation_rate.copysign(delta_theta),
            }
        }
    }

    /// Time derivative of the state held in `q`
    fn ode(&mut self, cmd: &ShipCommand) {
        let params = self.model.params();
        let center = params.center();
        let (k, h) = (params.spring_constant, params.damping);
        let q = &self.q;
        let qdot = &mut self.qdot;

        let offset = 4 * self.model.num_koules();
        for i in (0..offset).step_by(4) {
            qdot[i] = q[i + 2];
            qdot[i + 1] = q[i + 3];
            qdot[i + 2] = (center - q[i]) * k - q[i + 2] * h;
            qdot[i + 3] = (center - q[i + 1]) * k - q[i + 3] * h;
        }
        qdot[offset] = q[offset + 2];
        qdot[offset + 1] = q[offset + 3];
        qdot[offset + 2] = cmd.thrust.x;
        qdot[offset + 3] = cmd.thrust.y;
        qdot[offset + 4] = cmd.turn_rate;
    }

    /// One micro-step: resolve collisions, then advance every body that did
    /// not collide along the derivative
    fn update(&mut self, dt: f64) {
        let bodies = self.model.num_bodies();
        self.has_collision.iter_mut().for_each(|c| *c = false);

        for i in 0..bodies {
            for j in (i + 1)..bodies {
                if self.check_collision(i, j, dt) {
                    self.has_collision[i] = true;
                    self.has_collision[j] = true;
                }
            }
        }

        let ship = self.model.ship_index();
        for i in 0..ship {
            if !self.has_collision[i] {
                for j in 4 * i..4 * i + 4 {
                    self.q[j] += self.qdot[j] * dt;
                }
            }
        }
        // the ship's orientation rides along with its linear state
        if !self.has_collision[ship] {
            for j in 4 * ship..4 * ship + 5 {
                self.q[j] += self.qdot[j] * dt;
            }
        }
    }

    fn disk(&self, i: usize) -> Disk {
        let b = &self.q[4 * i..4 * i + 4];
        Disk::new(
            Vector2::new(b[0], b[1]),
            Vector2::new(b[2], b[3]),
            self.model.mass(i),
            self.model.radius(i),
        )
    }

    /// Resolve a collision between bodies `i` and `j` directly in `q`,
    /// advancing both with their new velocities
    fn check_collision(&mut self, i: usize, j: usize, dt: f64) -> bool {
        let a = self.disk(i);
        let b = self.disk(j);
        match collide(&a, &b, self.model.params().collision_delta) {
            Some((a_vel, b_vel)) => {
                for (k, v) in [(i, a_vel), (j, b_vel)] {
                    let body = &mut self.q[4 * k..4 * k + 4];
                    body[0] += v.x * dt;
                    body[1] += v.y * dt;
                    body[2] = v.x;
                    body[3] = v.y;
                }
                true
            }
            None => false,
        }
    }
}

impl StatePropagator for KoulesStatePropagator {
    fn propagate(
        &mut self,
        start: &KoulesState,
        control: &Control,
        duration: f64,
        result: &mut KoulesState,
    ) {
        let num_steps = (duration / self.time_step).ceil().max(0.0) as usize;

        self.q.copy_from_slice(start.as_slice());
        if num_steps > 0 {
            let dt = duration / num_steps as f64;
            let cmd = self.ship_command(start, control);
            for _ in 0..num_steps {
                self.ode(&cmd);
                self.update(dt);
            }
        }

        result.as_mut_slice().copy_from_slice(&self.q);
        let theta = result.ship_orientation();
        result.set_ship_orientation(normalize_angle(theta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn propagator(num_koules: usize) -> KoulesStatePropagator {
        KoulesStatePropagator::new(Arc::new(KoulesModel::with_defaults(num_koules).unwrap()))
    }

    #[test]
    fn test_ship_idles_at_target_velocity() {
        let prop = propagator(0);
        let mut s = prop.model().zero_state();
        s.set_ship_velocity(0.2, 0.0);
        let cmd = prop.ship_command(&s, &Control::new(0.21, 0.0));
        assert_eq!(cmd, ShipCommand::idle());
    }

    #[test]
    fn test_ship_thrusts_when_aligned() {
        let prop = propagator(0);
        let s = prop.model().zero_state();
        let cmd = prop.ship_command(&s, &Control::new(0.5, 0.0));
        assert!((cmd.thrust - Vector2::new(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(cmd.turn_rate, 0.0);
    }

    #[test]
    fn test_ship_turns_shortest_way() {
        let prop = propagator(0);
        let mut s = prop.model().zero_state();
        // target straight up: turn counterclockwise
        let cmd = prop.ship_command(&s, &Control::new(0.0, 0.5));
        assert_eq!(cmd.thrust, Vector2::zeros());
        assert!((cmd.turn_rate - PI).abs() < 1e-12);

        // heading -3.0, target heading 3.0: clockwise across the seam is shorter
        s.set_ship_orientation(-3.0);
        let cmd = prop.ship_command(&s, &Control::new(0.5 * 3.0f64.cos(), 0.5 * 3.0f64.sin()));
        assert!((cmd.turn_rate + PI).abs() < 1e-12);
    }

    #[test]
    fn test_free_ship_keeps_coasting() {
        let mut prop = propagator(0);
        let mut s = prop.model().zero_state();
        s.set_ship_position(0.5, 0.5);
        s.set_ship_velocity(0.1, 0.0);
        let mut out = prop.model().zero_state();
        // control equals the current velocity, so the ship idles
        prop.propagate(&s, &Control::new(0.1, 0.0), 0.05, &mut out);
        assert!((out.ship_position().x - 0.505).abs() < 1e-12);
        assert!((out.ship_position().y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_thrust_accelerates_ship() {
        let mut prop = propagator(0);
        let mut s = prop.model().zero_state();
        s.set_ship_position(0.5, 0.5);
        let mut out = prop.model().zero_state();
        prop.propagate(&s, &Control::new(0.5, 0.0), 0.05, &mut out);
        // unit thrust for 0.05 s
        assert!((out.ship_velocity().x - 0.05).abs() < 1e-12);
        assert!(out.ship_position().x > 0.5);
    }

    #[test]
    fn test_koule_pulled_toward_center() {
        let mut prop = propagator(1);
        let mut s = prop.model().zero_state();
        s.set_body_position(0, 0.8, 0.5);
        s.set_ship_position(0.1, 0.1);
        let mut out = prop.model().zero_state();
        prop.propagate(&s, &Control::zero(), 0.1, &mut out);
        assert!(out.body_velocity(0).x < 0.0);
        assert!(out.body_position(0).x < 0.8);
    }

    #[test]
    fn test_micro_step_count_rounds_up() {
        // 0.015 s with a 0.01 s micro-step is two steps of 0.0075 s
        let mut prop = propagator(0);
        let mut s = prop.model().zero_state();
        s.set_ship_position(0.5, 0.5);
        let mut out = prop.model().zero_state();
        prop.propagate(&s, &Control::new(0.5, 0.0), 0.015, &mut out);
        assert!((out.ship_velocity().x - 0.015).abs() < 1e-12);
        // x advanced only during the second step: 0.0075 * 0.0075
        assert!((out.ship_position().x - (0.5 + 0.0075 * 0.0075)).abs() < 1e-12);
    }

    #[test]
    fn test_orientation_is_wrapped() {
        let mut prop = propagator(0);
        let mut s = prop.model().zero_state();
        s.set_ship_position(0.5, 0.5);
        s.set_ship_orientation(PI - 0.01);
        let mut out = prop.model().zero_state();
        // target heading is about -2.6 rad: counterclockwise across the seam is shorter
        prop.propagate(&s, &Control::new(-0.5, -0.3), 0.05, &mut out);
        let theta = out.ship_orientation();
        assert!(theta > -PI && theta <= PI);
        assert!(theta < 0.0);
    }

    #[test]
    fn test_head_on_koules_bounce() {
        let mut prop = propagator(2);
        let mut s = prop.model().zero_state();
        s.set_body_position(0, 0.485, 0.5);
        s.set_body_velocity(0, 1.0, 0.0);
        s.set_body_position(1, 0.515, 0.5);
        s.set_body_velocity(1, -1.0, 0.0);
        s.set_ship_position(0.1, 0.1);
        let mut out = prop.model().zero_state();
        prop.propagate(&s, &Control::zero(), 0.01, &mut out);
        assert!((out.body_velocity(0).x + 1.0).abs() < 1e-12);
        assert!((out.body_velocity(1).x - 1.0).abs() < 1e-12);
        // advanced with the new velocities over the micro-step
        assert!((out.body_position(0).x - 0.475).abs() < 1e-12);
        assert!((out.body_position(1).x - 0.525).abs() < 1e-12);
    }

    #[test]
    fn test_ship_koule_collision_freezes_orientation() {
        let mut prop = propagator(1);
        let model = prop.model().clone();
        let mut s = model.zero_state();
        s.set_body_position(0, 0.5, 0.5);
        s.set_ship_position(0.545, 0.5);
        s.set_ship_velocity(-1.0, 0.0);
        s.set_ship_orientation(1.0);
        let mut out = model.zero_state();
        // the target heading differs from 1.0 rad, so the ship wants to turn
        let control = Control::new(0.0, 0.5);
        assert!(prop.ship_command(&s, &control).turn_rate != 0.0);
        prop.propagate(&s, &control, 0.01, &mut out);

        assert_eq!(out.ship_orientation(), 1.0);
        assert!((out.body_velocity(0) - Vector2::new(-1.2, 0.0)).norm() < 1e-12);
        assert!((out.ship_velocity() - Vector2::new(-0.2, 0.0)).norm() < 1e-12);

        let momentum = |st: &KoulesState| {
            st.body_velocity(0) * model.mass(0) + st.ship_velocity() * model.mass(1)
        };
        assert!((momentum(&s) - momentum(&out)).norm() < 1e-12);
    }

    #[test]
    fn test_chained_collisions_compose() {
        let mut prop = propagator(3);
        let model = prop.model().clone();
        let mut s = model.zero_state();
        for (i, (x, vx)) in [(0.47, 1.0), (0.5, 0.0), (0.53, -1.0)].into_iter().enumerate() {
            s.set_body_position(i, x, 0.5);
            s.set_body_velocity(i, vx, 0.0);
        }
        s.set_ship_position(0.5, 0.8);
        let mut out = model.zero_state();
        prop.propagate(&s, &Control::zero(), 0.01, &mut out);

        // 0-1 swap first, then 1 (now moving right) swaps with 2
        for (i, expected) in [0.0, -1.0, 1.0].into_iter().enumerate() {
            assert!((out.body_velocity(i).x - expected).abs() < 1e-12);
            assert!(out.body_velocity(i).y.abs() < 1e-12);
        }

        let totals = |st: &KoulesState| {
            (0..3).fold((Vector2::<f64>::zeros(), 0.0), |(p, e), i| {
                let v = st.body_velocity(i);
                (p + v * model.mass(i), e + model.mass(i) * v.norm_squared())
            })
        };
        let (p0, e0) = totals(&s);
        let (p1, e1) = totals(&out);
        assert!((p0 - p1).norm() < 1e-12);
        assert!((e0 - e1).abs() < 1e-12);
    }

    #[test]
    fn test_propagate_is_deterministic() {
        let mut prop = propagator(3);
        let mut s = prop.model().zero_state();
        for i in 0..3 {
            s.set_body_position(i, 0.3 + 0.2 * i as f64, 0.4);
            s.set_body_velocity(i, 0.3, -0.2 * i as f64);
        }
        s.set_ship_position(0.5, 0.6);
        s.set_ship_orientation(1.0);
        let control = Control::new(0.2, -0.3);
        let mut a = prop.model().zero_state();
        let mut b = prop.model().zero_state();
        prop.propagate(&s, &control, 1.3, &mut a);
        prop.propagate(&s, &control, 1.3, &mut b);
        assert_eq!(a, b);
    }
}
