//! Start states and level transitions
//!
//! A full game is solved level by level: once some koules have left the
//! workspace, the remaining ones form a smaller problem with a fresh model.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::Rng;

use super::model::KoulesModel;
use super::params::KoulesParams;
use crate::common::{KoulesResult, KoulesState};

/// Koules evenly spread by angle, at a linearly increasing distance from the
/// center; the ship sits at the center. All velocities are zero.
pub fn default_start_state(model: &KoulesModel) -> KoulesState {
    let n = model.num_koules();
    let center = model.params().center();
    let mut state = model.zero_state();

    let delta = if n > 0 { 2.0 * PI / n as f64 } else { 2.0 * PI };
    let mut theta = PI;
    for i in 0..n {
        let r = 0.1 + i as f64 * 0.1 / n as f64;
        state.set_body_position(i, center + r * theta.cos(), center + r * theta.sin());
        theta += delta;
    }
    state.set_ship_position(center, center);
    state.set_ship_orientation(0.5 * delta);
    state
}

/// Give every koule speed `speed` in a uniformly random direction
pub fn randomize_koule_velocities<R: Rng + ?Sized>(
    state: &mut KoulesState,
    speed: f64,
    rng: &mut R,
) {
    for i in 0..state.num_koules() {
        let theta = rng.gen_range(0.0..2.0 * PI);
        state.set_body_velocity(i, speed * theta.cos(), speed * theta.sin());
    }
}

/// Start state of the next level.
///
/// Keeps the koules still strictly inside the workspace and the ship.
/// Returns `None` when no koule has left, since the problem would not shrink.
pub fn next_level_start(model: &KoulesModel, final_state: &KoulesState) -> Option<Vec<f64>> {
    let params = model.params();
    let (lo, hi) = (params.koule_radius, params.side_length - params.koule_radius);
    let values = final_state.as_slice();

    let mut next = Vec::with_capacity(values.len());
    for i in 0..model.num_koules() {
        let p = final_state.body_position(i);
        if p.x.min(p.y) > lo && p.x.max(p.y) < hi {
            next.extend_from_slice(&values[4 * i..4 * i + 4]);
        }
    }
    next.extend_from_slice(&values[values.len() - 5..]);

    if next.len() < values.len() {
        Some(next)
    } else {
        None
    }
}

/// Model and start state of the level after `final_state`
pub fn next_level(
    model: &KoulesModel,
    final_state: &KoulesState,
) -> KoulesResult<Option<(Arc<KoulesModel>, KoulesState)>> {
    let reals = match next_level_start(model, final_state) {
        Some(reals) => reals,
        None => return Ok(None),
    };
    let num_koules = (reals.len() - 5) / 4;
    let params: KoulesParams = model.params().clone();
    let next_model = Arc::new(KoulesModel::new(num_koules, params)?);
    let start = next_model.state_from_reals(&reals)?;
    Ok(Some((next_model, start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_start_state_layout() {
        let model = KoulesModel::with_defaults(3).unwrap();
        let s = default_start_state(&model);
        assert!(model.satisfies_bounds(&s));

        // first koule is 0.1 to the left of the center
        let p0 = s.body_position(0);
        assert!((p0.x - 0.4).abs() < 1e-12);
        assert!((p0.y - 0.5).abs() < 1e-12);

        // later koules sit further out
        let r2 = (s.body_position(2) - nalgebra::Vector2::new(0.5, 0.5)).norm();
        assert!((r2 - (0.1 + 2.0 * 0.1 / 3.0)).abs() < 1e-12);

        assert_eq!(s.ship_position(), nalgebra::Vector2::new(0.5, 0.5));
        assert!((s.ship_orientation() - PI / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_randomized_velocities_have_requested_speed() {
        let model = KoulesModel::with_defaults(4).unwrap();
        let mut s = default_start_state(&model);
        let mut rng = StdRng::seed_from_u64(3);
        randomize_koule_velocities(&mut s, 0.2, &mut rng);
        for i in 0..4 {
            assert!((s.body_velocity(i).norm() - 0.2).abs() < 1e-12);
        }
        assert_eq!(s.ship_velocity(), nalgebra::Vector2::zeros());
    }

    #[test]
    fn test_next_level_drops_escaped_koules() {
        let model = KoulesModel::with_defaults(3).unwrap();
        let mut s = default_start_state(&model);
        s.set_body_position(1, 0.005, 0.5);
        s.set_body_velocity(2, 0.1, 0.2);

        let (next_model, next) = next_level(&model, &s).unwrap().unwrap();
        assert_eq!(next_model.num_koules(), 2);
        assert_eq!(next.body_position(0), s.body_position(0));
        assert_eq!(next.body_position(1), s.body_position(2));
        assert_eq!(next.body_velocity(1), s.body_velocity(2));
        assert_eq!(next.ship_orientation(), s.ship_orientation());
    }

    #[test]
    fn test_next_level_requires_progress() {
        let model = KoulesModel::with_defaults(2).unwrap();
        let s = default_start_state(&model);
        assert!(next_level_start(&model, &s).is_none());
        assert!(next_level(&model, &s).unwrap().is_none());
    }
}
