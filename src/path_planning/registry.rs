//! Name-keyed factory of trajectory generators
//!
//! The planning loop instantiates its generator from a name and a flat
//! parameter map, so variants can be swapped through configuration alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;
use serde_json::Value;

use crate::common::{BoundingVolume, PlannerError, PlannerResult, TrajectoryGenerator, TraversabilityOracle};

use super::rrt::RrtGenerator;

/// Registry name of the RRT generator
pub const RRT_NAME: &str = "RRT";

/// Flat parameter map, name to typed value
pub type ParamMap = serde_json::Map<String, Value>;

/// Collaborators handed to every generator at construction
#[derive(Clone)]
pub struct GeneratorContext {
    pub bounds: BoundingVolume,
    pub oracle: Arc<dyn TraversabilityOracle>,
    /// Fixed random seed, entropy-seeded when `None`
    pub seed: Option<u64>,
}

pub type GeneratorFactory = fn(&ParamMap, &GeneratorContext) -> PlannerResult<Box<dyn TrajectoryGenerator>>;

fn create_rrt(params: &ParamMap, context: &GeneratorContext) -> PlannerResult<Box<dyn TrajectoryGenerator>> {
    Ok(Box::new(RrtGenerator::from_params(params, context)?))
}

#[derive(Default)]
pub struct GeneratorRegistry {
    factories: BTreeMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every generator shipped by this crate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RRT_NAME, create_rrt);
        registry
    }

    /// Register `factory` under `name`, returning the factory it replaces
    pub fn register(&mut self, name: &str, factory: GeneratorFactory) -> Option<GeneratorFactory> {
        self.factories.insert(name.to_string(), factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in lexical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(
        &self,
        name: &str,
        params: &ParamMap,
        context: &GeneratorContext,
    ) -> PlannerResult<Box<dyn TrajectoryGenerator>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PlannerError::UnknownGenerator(name.to_string()))?;
        let generator = factory(params, context)?;
        info!("created trajectory generator {}", name);
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TrajectoryPoint;
    use crate::trajectory_tree::{SegmentId, TrajectoryTree};
    use nalgebra::Vector3;
    use serde_json::json;

    struct FreeSpace;

    impl TraversabilityOracle for FreeSpace {
        fn is_traversable(&self, _point: &Vector3<f64>) -> bool {
            true
        }

        fn resolution(&self) -> f64 {
            0.5
        }
    }

    struct Idle;

    impl TrajectoryGenerator for Idle {
        fn name(&self) -> &str {
            "Idle"
        }

        fn select_segment(&mut self, tree: &TrajectoryTree) -> Option<SegmentId> {
            Some(tree.root())
        }

        fn expand_segment(&mut self, _: &mut TrajectoryTree, _: Option<SegmentId>, _: &mut Vec<SegmentId>) -> bool {
            false
        }
    }

    fn context() -> GeneratorContext {
        GeneratorContext {
            bounds: BoundingVolume::from_array([-5.0, 5.0, -5.0, 5.0, 0.0, 2.0]).unwrap(),
            oracle: Arc::new(FreeSpace),
            seed: Some(3),
        }
    }

    #[test]
    fn test_create_rrt_by_name() {
        let registry = GeneratorRegistry::with_defaults();
        let params = json!({ "max_extension_range": 0.5, "velocity": 2.0 });
        let mut generator = registry
            .create("RRT", params.as_object().unwrap(), &context())
            .unwrap();
        assert_eq!(generator.name(), "RRT");

        let mut tree = TrajectoryTree::from_pose(TrajectoryPoint::at(Vector3::new(0.0, 0.0, 1.0)));
        let target = generator.select_segment(&tree);
        assert_eq!(target, Some(tree.root()));
        let mut new_segments = Vec::new();
        assert!(generator.expand_segment(&mut tree, target, &mut new_segments));
        assert_eq!(new_segments.len(), 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_unknown_name() {
        let registry = GeneratorRegistry::with_defaults();
        let result = registry.create("RRT*", &ParamMap::new(), &context());
        assert!(matches!(result, Err(PlannerError::UnknownGenerator(name)) if name == "RRT*"));
    }

    #[test]
    fn test_invalid_params_propagate() {
        let registry = GeneratorRegistry::with_defaults();
        let params = json!({ "sampling_rate": -1.0 });
        let result = registry.create("RRT", params.as_object().unwrap(), &context());
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
    }

    #[test]
    fn test_register_custom_generator() {
        fn create_idle(_: &ParamMap, _: &GeneratorContext) -> PlannerResult<Box<dyn TrajectoryGenerator>> {
            Ok(Box::new(Idle))
        }

        let mut registry = GeneratorRegistry::with_defaults();
        assert!(registry.register("Idle", create_idle).is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Idle", "RRT"]);
        let generator = registry.create("Idle", &ParamMap::new(), &context()).unwrap();
        assert_eq!(generator.name(), "Idle");
        assert!(GeneratorRegistry::new().names().next().is_none());
    }
}
