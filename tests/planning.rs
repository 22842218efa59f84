use std::sync::Arc;

use koules_dynamics::koules::{default_start_state, BoundsValidityChecker, KoulesModel, KoulesStatePropagator};
use koules_dynamics::path_planning::{solve_one_level, PlannerRegistry};
use koules_dynamics::utils::read_matrix;
use koules_dynamics::{GoalRegion, StatePropagator};

#[test]
fn planned_path_replays_and_round_trips_through_matrix_file() {
    let registry = PlannerRegistry::new();
    for name in registry.names() {
        let model = Arc::new(KoulesModel::with_defaults(2).unwrap());
        let start = default_start_state(&model);
        let solution = solve_one_level(&registry, name, model.clone(), &start, 0.2, 11).unwrap();

        let mut path = solution.path;
        let mut propagator = KoulesStatePropagator::new(model.clone());

        // replaying every segment one propagation step at a time reproduces
        // its recorded end state
        let step = model.params().propagation_step;
        for (i, (control, &n)) in path.controls().iter().zip(path.steps()).enumerate() {
            let mut state = path.states()[i].clone();
            let mut next = model.zero_state();
            for _ in 0..n {
                propagator.propagate(&state, control, step, &mut next);
                state.copy_from(&next);
            }
            let recorded = &path.states()[i + 1];
            assert!(model.distance(&state, recorded) < 1e-9, "{}: segment {}", name, i);
        }

        path.interpolate(&mut propagator);
        assert!(path.check(&BoundsValidityChecker::new(model.clone())));

        let mut buf = Vec::new();
        path.print_as_matrix(&mut buf).unwrap();
        let rows = read_matrix(&buf[..]).unwrap();
        assert_eq!(rows.len(), path.len());
        assert!(rows.iter().all(|r| r.len() == model.dimension() + 3));
        assert_eq!(&rows[0][..model.dimension()], start.as_slice());
    }
}

#[test]
fn goal_distance_never_increases_along_best_solution() {
    let registry = PlannerRegistry::new();
    let model = Arc::new(KoulesModel::with_defaults(1).unwrap());
    let start = default_start_state(&model);
    let goal = koules_dynamics::koules::KoulesGoal::with_seed(model.clone(), 0);
    let solution = solve_one_level(&registry, "rrt", model, &start, 0.2, 4).unwrap();
    assert!(solution.goal_distance <= goal.distance_goal(&start));
    assert_eq!(solution.goal_distance, goal.distance_goal(solution.path.final_state()));
}
