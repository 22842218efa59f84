//! Koules dynamics core
//!
//! A square workspace holds a number of passive koules pulled toward the
//! center by damped springs, and a single actively steered ship. The goal is
//! to push a koule out of the workspace. This module provides everything a
//! kinodynamic planner needs to query that world.
//!
//! # Components
//!
//! - `params`: physical and propagation constants of one problem instance
//! - `model`: state layout, body tables, bounds and distance
//! - `projection`: low-dimensional coordinates for spatial bucketing
//! - `control_sampler`: target-velocity controls aimed at workspace points
//! - `directed_sampler`: simulate-until-goal-or-invalid control sampling
//! - `propagator`: equations of motion, integrator and collision handling
//! - `collision`: pairwise elastic collision response
//! - `goal`: goal distance and goal sampling
//! - `setup`: start states and level transitions
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use koules_dynamics::common::{Control, StatePropagator};
//! use koules_dynamics::koules::{default_start_state, KoulesModel, KoulesStatePropagator};
//!
//! let model = Arc::new(KoulesModel::with_defaults(3).unwrap());
//! let mut propagator = KoulesStatePropagator::new(model.clone());
//! let start = default_start_state(&model);
//! let mut result = model.zero_state();
//! propagator.propagate(&start, &Control::new(0.3, 0.1), 0.05, &mut result);
//! ```
//!
//! # References
//!
//! - A. M. Ladd and L. E. Kavraki, "Motion planning in the presence of drift,
//!   underactuation and discrete system changes", RSS 2005
//! - A. M. Ladd, "Motion Planning for Physical Simulation", PhD thesis, Rice
//!   University, 2006

pub mod params;
pub mod model;
pub mod projection;
pub mod collision;
pub mod propagator;
pub mod control_sampler;
pub mod directed_sampler;
pub mod goal;
pub mod setup;

// Re-exports
pub use params::KoulesParams;
pub use model::{BoundsValidityChecker, KoulesModel, StateBounds};
pub use projection::KoulesProjection;
pub use collision::Disk;
pub use propagator::{KoulesStatePropagator, ShipCommand};
pub use control_sampler::KoulesControlSampler;
pub use directed_sampler::KoulesDirectedControlSampler;
pub use goal::KoulesGoal;
pub use setup::{default_start_state, next_level, next_level_start, randomize_koule_velocities};
