//! Projection of the full state onto ship pose and leading koule positions

use nalgebra::DVector;

use super::model::KoulesModel;
use crate::common::{KoulesState, ProjectionEvaluator};

/// Default cell size of the projection grid along every axis
pub const DEFAULT_CELL_SIZE: f64 = 0.05;

/// Coordinates, in order: ship x, ship y, ship orientation, then the
/// positions of the first koules. Koules are exchangeable, so a smaller
/// projection simply leaves out the trailing ones.
#[derive(Debug, Clone, PartialEq)]
pub struct KoulesProjection {
    num_dimensions: usize,
}

impl KoulesProjection {
    /// Projection with `requested` dimensions clipped to `[3, 2 * num_koules + 3]`
    pub fn new(model: &KoulesModel, requested: usize) -> Self {
        let full = Self::full_dimension(model);
        Self {
            num_dimensions: requested.clamp(3, full),
        }
    }

    /// Ship pose only
    pub fn ship_only(model: &KoulesModel) -> Self {
        Self::new(model, 3)
    }

    /// Ship pose and every koule
    pub fn full(model: &KoulesModel) -> Self {
        Self::new(model, Self::full_dimension(model))
    }

    fn full_dimension(model: &KoulesModel) -> usize {
        (model.dimension() - 1) / 2 + 1
    }

    fn num_projected_koules(&self) -> usize {
        (self.num_dimensions - 3) / 2
    }
}

impl ProjectionEvaluator for KoulesProjection {
    fn dimension(&self) -> usize {
        self.num_dimensions
    }

    fn project(&self, state: &KoulesState) -> DVector<f64> {
        let mut out = DVector::zeros(self.num_dimensions);
        let ship = state.ship_position();
        out[0] = ship.x;
        out[1] = ship.y;
        out[2] = state.ship_orientation();
        for i in 0..self.num_projected_koules() {
            let p = state.body_position(i);
            out[2 * i + 3] = p.x;
            out[2 * i + 4] = p.y;
        }
        out
    }

    fn default_cell_sizes(&self) -> Vec<f64> {
        vec![DEFAULT_CELL_SIZE; self.num_dimensions]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_clipping() {
        let model = KoulesModel::with_defaults(3).unwrap();
        assert_eq!(KoulesProjection::new(&model, 0).dimension(), 3);
        assert_eq!(KoulesProjection::new(&model, 5).dimension(), 5);
        assert_eq!(KoulesProjection::new(&model, 100).dimension(), 9);
        assert_eq!(KoulesProjection::full(&model).dimension(), 9);
        assert_eq!(KoulesProjection::ship_only(&model).default_cell_sizes(), vec![0.05; 3]);
    }

    #[test]
    fn test_projection_order() {
        let model = KoulesModel::with_defaults(2).unwrap();
        let mut s = model.zero_state();
        s.set_body_position(0, 0.1, 0.2);
        s.set_body_position(1, 0.3, 0.4);
        s.set_ship_position(0.5, 0.6);
        s.set_ship_orientation(0.7);

        let full = KoulesProjection::full(&model).project(&s);
        assert_eq!(full.as_slice(), &[0.5, 0.6, 0.7, 0.1, 0.2, 0.3, 0.4]);

        // trailing koules are dropped first
        let partial = KoulesProjection::new(&model, 5).project(&s);
        assert_eq!(partial.as_slice(), &[0.5, 0.6, 0.7, 0.1, 0.2]);
    }
}
