//! Planner lookup by name

use std::sync::Arc;

use log::warn;

use super::control_rrt::ControlRRT;
use super::est::EST;
use crate::common::{KoulesError, KoulesResult, Planner};
use crate::koules::KoulesModel;

/// Planner used when a requested name is unknown
pub const DEFAULT_PLANNER: &str = "rrt";

/// Builds a planner for a model from a seed
pub type PlannerFactory = fn(Arc<KoulesModel>, u64) -> Box<dyn Planner>;

fn make_rrt(model: Arc<KoulesModel>, seed: u64) -> Box<dyn Planner> {
    Box::new(ControlRRT::with_defaults(model, seed))
}

fn make_est(model: Arc<KoulesModel>, seed: u64) -> Box<dyn Planner> {
    Box::new(EST::with_defaults(model, seed))
}

/// Named planner factories
pub struct PlannerRegistry {
    entries: Vec<(String, PlannerFactory)>,
}

impl Default for PlannerRegistry {
    fn default() -> Self {
        let mut registry = PlannerRegistry {
            entries: Vec::new(),
        };
        registry.register("rrt", make_rrt);
        registry.register("est", make_est);
        registry
    }
}

impl PlannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a planner, replacing any planner of the same name
    pub fn register(&mut self, name: &str, factory: PlannerFactory) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((name.to_string(), factory)),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Factory for `name`, or `UnknownPlanner`
    pub fn resolve_strict(&self, name: &str) -> KoulesResult<PlannerFactory> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| KoulesError::UnknownPlanner(name.to_string()))
    }

    /// Factory for `name`, falling back to the default planner
    pub fn resolve(&self, name: &str) -> KoulesResult<PlannerFactory> {
        match self.resolve_strict(name) {
            Ok(factory) => Ok(factory),
            Err(KoulesError::UnknownPlanner(_)) => {
                warn!(
                    "Unknown planner '{}', using default planner '{}'",
                    name, DEFAULT_PLANNER
                );
                self.resolve_strict(DEFAULT_PLANNER)
            }
            Err(e) => Err(e),
        }
    }

    /// Build the planner registered as `name` (with fallback)
    pub fn create(
        &self,
        name: &str,
        model: Arc<KoulesModel>,
        seed: u64,
    ) -> KoulesResult<Box<dyn Planner>> {
        let factory = self.resolve(name)?;
        Ok(factory(model, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let registry = PlannerRegistry::new();
        assert_eq!(registry.names(), vec!["rrt", "est"]);
    }

    #[test]
    fn test_strict_rejects_unknown() {
        let registry = PlannerRegistry::new();
        assert!(matches!(
            registry.resolve_strict("kpiece"),
            Err(KoulesError::UnknownPlanner(name)) if name == "kpiece"
        ));
    }

    #[test]
    fn test_unknown_falls_back_to_rrt() {
        let registry = PlannerRegistry::new();
        let model = Arc::new(KoulesModel::with_defaults(1).unwrap());
        let planner = registry.create("kpiece", model.clone(), 0).unwrap();
        assert_eq!(planner.name(), "rrt");
        let planner = registry.create("est", model, 0).unwrap();
        assert_eq!(planner.name(), "est");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = PlannerRegistry::new();
        registry.register("rrt", make_est);
        assert_eq!(registry.names().len(), 2);
        let model = Arc::new(KoulesModel::with_defaults(1).unwrap());
        assert_eq!(registry.create("rrt", model, 0).unwrap().name(), "est");
    }
}
