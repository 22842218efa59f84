// Kinodynamic planners over the koules dynamics

pub mod control_path;
pub mod control_rrt;
pub mod est;
pub mod registry;
pub mod level_solver;

pub use control_path::*;
pub use control_rrt::*;
pub use est::*;
pub use registry::*;
pub use level_solver::*;

/// Result of one planner run
#[derive(Debug, Clone)]
pub struct PlannerSolution {
    /// Path from the start to the state closest to the goal
    pub path: ControlPath,
    /// True when the final state satisfies the goal
    pub exact: bool,
    /// Goal distance of the final state
    pub goal_distance: f64,
}
