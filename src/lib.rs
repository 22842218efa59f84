//! koules_dynamics - ship and koules dynamics for kinodynamic planning
//!
//! This crate models the Koules game: a ship steered by target-velocity
//! controls bumps passive, spring-bound koules out of a square workspace.
//! It provides the state propagator, control samplers, goal region and
//! projection that sampling-based planners need, plus two such planners.

// Core modules
pub mod common;
pub mod utils;

// Dynamics and planning
pub mod koules;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Control, KoulesState};
pub use common::{
    ControlSampler, DirectedControlSampler, GoalRegion, Planner, ProjectionEvaluator,
    StatePropagator, StateValidityChecker,
};
pub use common::{KoulesError, KoulesResult};
