//! Control paths: the states a planner visited and the controls between them

use std::io::Write;

use crate::common::{Control, KoulesResult, KoulesState, StatePropagator, StateValidityChecker};
use crate::utils::write_matrix;

/// Tree node of a kinodynamic planner
#[derive(Debug, Clone)]
pub struct Motion {
    pub state: KoulesState,
    /// Control that led here from the parent
    pub control: Control,
    pub steps: usize,
    pub parent: Option<usize>,
}

impl Motion {
    pub fn root(state: KoulesState) -> Self {
        Motion {
            state,
            control: Control::zero(),
            steps: 0,
            parent: None,
        }
    }
}

/// Sequence of states joined by controls held for a number of propagation
/// steps.
///
/// `controls[i]` held for `steps[i]` steps leads from `states[i]` to
/// `states[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPath {
    states: Vec<KoulesState>,
    controls: Vec<Control>,
    steps: Vec<usize>,
    step_size: f64,
}

impl ControlPath {
    pub fn new(start: KoulesState, step_size: f64) -> Self {
        Self {
            states: vec![start],
            controls: Vec::new(),
            steps: Vec::new(),
            step_size,
        }
    }

    /// Path from the root of `tree` to the node `leaf`
    pub fn from_tree(tree: &[Motion], leaf: usize, step_size: f64) -> Self {
        let mut chain = Vec::new();
        let mut node = Some(leaf);
        while let Some(i) = node {
            chain.push(i);
            node = tree[i].parent;
        }
        chain.reverse();

        let mut path = ControlPath::new(tree[chain[0]].state.clone(), step_size);
        for &i in &chain[1..] {
            let m = &tree[i];
            path.append(m.control, m.steps, m.state.clone());
        }
        path
    }

    pub fn append(&mut self, control: Control, steps: usize, state: KoulesState) {
        self.controls.push(control);
        self.steps.push(steps);
        self.states.push(state);
    }

    pub fn states(&self) -> &[KoulesState] {
        &self.states
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Duration of each control [s]
    pub fn durations(&self) -> Vec<f64> {
        self.steps.iter().map(|&n| n as f64 * self.step_size).collect()
    }

    pub fn total_duration(&self) -> f64 {
        self.durations().iter().sum()
    }

    pub fn final_state(&self) -> &KoulesState {
        // never empty: built with a start state
        &self.states[self.states.len() - 1]
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Split every multi-step segment into single propagation steps,
    /// recomputing the intermediate states
    pub fn interpolate<P: StatePropagator>(&mut self, propagator: &mut P) {
        let mut states = Vec::with_capacity(self.states.len());
        let mut controls = Vec::with_capacity(self.controls.len());
        let mut steps = Vec::with_capacity(self.steps.len());
        states.push(self.states[0].clone());

        for (i, (control, &n)) in self.controls.iter().zip(self.steps.iter()).enumerate() {
            let mut current = self.states[i].clone();
            for _ in 1..n {
                let mut next = current.clone();
                propagator.propagate(&current, control, self.step_size, &mut next);
                states.push(next.clone());
                controls.push(*control);
                steps.push(1);
                current = next;
            }
            // the recorded end state closes the segment
            states.push(self.states[i + 1].clone());
            controls.push(*control);
            steps.push(n.min(1));
        }

        self.states = states;
        self.controls = controls;
        self.steps = steps;
    }

    /// True when every state passes `checker`
    pub fn check<V: StateValidityChecker>(&self, checker: &V) -> bool {
        self.states.iter().all(|s| checker.is_valid(s))
    }

    /// Rows of the persisted format: each state followed by the control and
    /// duration that reached it; the start row has zeros there
    pub fn matrix_rows(&self) -> Vec<Vec<f64>> {
        let mut rows = Vec::with_capacity(self.states.len());
        let mut first = self.states[0].to_reals();
        first.extend_from_slice(&[0.0, 0.0, 0.0]);
        rows.push(first);

        for (i, duration) in self.durations().into_iter().enumerate() {
            let mut row = self.states[i + 1].to_reals();
            row.extend_from_slice(&[self.controls[i].vx, self.controls[i].vy, duration]);
            rows.push(row);
        }
        rows
    }

    pub fn print_as_matrix<W: Write>(&self, out: &mut W) -> KoulesResult<()> {
        write_matrix(out, self.matrix_rows())
    }
}
