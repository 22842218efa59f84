//! Pairwise elastic collision between two disks
//!
//! Velocities are split into components along the line of centers (normal)
//! and perpendicular to it (tangent). The normal components follow the
//! one-dimensional elastic collision formula, the tangential ones are kept.
//! See <http://en.wikipedia.org/wiki/Elastic_collision>.

use nalgebra::Vector2;

/// Tolerance of the conservation checks
pub const CONSERVATION_TOLERANCE: f64 = 1e-6;

/// Kinematic snapshot of one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub mass: f64,
    pub radius: f64,
}

impl Disk {
    pub fn new(position: Vector2<f64>, velocity: Vector2<f64>, mass: f64, radius: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius,
        }
    }
}

/// True when the disks are within `radius_a + radius_b + delta` of each other
/// and moving closer
pub fn is_colliding(a: &Disk, b: &Disk, delta: f64) -> bool {
    let d = a.position - b.position;
    let min_dist = a.radius + b.radius + delta;
    d.norm_squared() < min_dist * min_dist && (b.velocity - a.velocity).dot(&d) > 0.0
}

/// Post-collision velocities of `a` and `b`.
///
/// The centers must not coincide; [`is_colliding`] never reports a collision
/// for coincident centers.
pub fn elastic_response(a: &Disk, b: &Disk) -> (Vector2<f64>, Vector2<f64>) {
    let normal = (a.position - b.position).normalize();
    let tangent = Vector2::new(-normal.y, normal.x);

    let a_normal = normal.dot(&a.velocity);
    let a_tangent = tangent.dot(&a.velocity);
    let b_normal = normal.dot(&b.velocity);
    let b_tangent = tangent.dot(&b.velocity);

    let total = a.mass + b.mass;
    let a_normal_new = (a_normal * (a.mass - b.mass) + 2.0 * b.mass * b_normal) / total;
    let b_normal_new = (b_normal * (b.mass - a.mass) + 2.0 * a.mass * a_normal) / total;

    (
        normal * a_normal_new + tangent * a_tangent,
        normal * b_normal_new + tangent * b_tangent,
    )
}

/// Componentwise momentum change `m_a (v_a - v_a') + m_b (v_b - v_b')`
pub fn momentum_error(a: &Disk, b: &Disk, a_new: &Vector2<f64>, b_new: &Vector2<f64>) -> Vector2<f64> {
    (a.velocity - a_new) * a.mass + (b.velocity - b_new) * b.mass
}

/// Change of `m |v|^2` summed over both bodies
pub fn energy_error(a: &Disk, b: &Disk, a_new: &Vector2<f64>, b_new: &Vector2<f64>) -> f64 {
    a.mass * (a.velocity.norm_squared() - a_new.norm_squared())
        + b.mass * (b.velocity.norm_squared() - b_new.norm_squared())
}

/// Detect and resolve a collision between `a` and `b`.
///
/// Returns the new velocities, or `None` when the disks do not collide.
///
/// # Panics
///
/// Panics if the response violates momentum or energy conservation beyond
/// [`CONSERVATION_TOLERANCE`]; that can only be a logic error.
pub fn collide(a: &Disk, b: &Disk, delta: f64) -> Option<(Vector2<f64>, Vector2<f64>)> {
    if !is_colliding(a, b, delta) {
        return None;
    }
    let (a_new, b_new) = elastic_response(a, b);

    let dp = momentum_error(a, b, &a_new, &b_new);
    assert!(
        dp.x.abs() < CONSERVATION_TOLERANCE && dp.y.abs() < CONSERVATION_TOLERANCE,
        "collision response does not conserve momentum: {:?}",
        dp
    );
    let de = energy_error(a, b, &a_new, &b_new);
    assert!(
        de.abs() < CONSERVATION_TOLERANCE,
        "collision response does not conserve kinetic energy: {}",
        de
    );

    Some((a_new, b_new))
}
