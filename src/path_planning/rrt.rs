//! RRT (Rapidly-exploring Random Tree) trajectory generator
//!
//! Grows the trajectory tree one straight segment at a time: a goal is sampled
//! in the bounding volume, the segment whose endpoint is nearest to it is
//! selected, and a collision-checked segment of bounded length is attached
//! to it heading towards the goal.

use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, trace, warn};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{
    wrap_angle, BoundingVolume, PlannerError, PlannerResult, TrajectoryGenerator, TrajectoryPoint,
    TraversabilityOracle,
};
use crate::trajectory_tree::{SegmentId, TrajectoryTree};

use super::registry::{GeneratorContext, ParamMap, RRT_NAME};
use super::sampler::{CandidateSampler, SamplingPolicy};
use super::segment_index::SegmentIndex;

/// Configuration for the RRT generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RrtConfig {
    /// Nominal speed along a segment [m/s]
    pub velocity: f64,
    /// Poses per second of trajectory
    pub sampling_rate: f64,
    /// Maximum length of one segment [m], non-positive disables the cap
    pub max_extension_range: f64,
    /// Sample around the tree tip instead of uniformly in the box
    #[serde(alias = "use_spheric_sampling")]
    pub use_spherical_sampling: bool,
    /// Goal sampling attempts per selection, 0 for unlimited
    pub maximum_tries: usize,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            velocity: 1.0,
            sampling_rate: 1.0,
            max_extension_range: 1.0,
            use_spherical_sampling: false,
            maximum_tries: 1000,
        }
    }
}

impl RrtConfig {
    /// Read the recognized keys from a flat parameter map, defaulting the rest.
    ///
    /// Keys meant for other modules are ignored.
    pub fn from_params(params: &ParamMap) -> PlannerResult<Self> {
        let config: RrtConfig = serde_json::from_value(Value::Object(params.clone()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.velocity.is_finite() && self.velocity > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "velocity must be positive, got {}",
                self.velocity
            )));
        }
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "sampling_rate must be positive, got {}",
                self.sampling_rate
            )));
        }
        if self.max_extension_range.is_nan() {
            return Err(PlannerError::InvalidParameter(
                "max_extension_range is NaN".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sampling_policy(&self) -> SamplingPolicy {
        if self.use_spherical_sampling {
            SamplingPolicy::BiasedSpherical
        } else {
            SamplingPolicy::UniformBox
        }
    }
}

/// Number of equal steps of at most `step` covering `length`, at least one.
fn step_count(length: f64, step: f64) -> usize {
    if step > 0.0 {
        ((length / step).ceil() as usize).max(1)
    } else {
        1
    }
}

/// RRT trajectory generator
pub struct RrtGenerator<R = StdRng> {
    config: RrtConfig,
    sampler: CandidateSampler,
    index: SegmentIndex,
    oracle: Arc<dyn TraversabilityOracle>,
    rng: R,
    goal: Option<Vector3<f64>>,
}

impl RrtGenerator<StdRng> {
    /// Create a generator seeded from system entropy
    pub fn new(
        config: RrtConfig,
        bounds: BoundingVolume,
        oracle: Arc<dyn TraversabilityOracle>,
    ) -> PlannerResult<Self> {
        Self::with_rng(config, bounds, oracle, StdRng::from_entropy())
    }

    /// Create a generator with a reproducible random sequence
    pub fn with_seed(
        config: RrtConfig,
        bounds: BoundingVolume,
        oracle: Arc<dyn TraversabilityOracle>,
        seed: u64,
    ) -> PlannerResult<Self> {
        Self::with_rng(config, bounds, oracle, StdRng::seed_from_u64(seed))
    }

    /// Build from a parameter map, as done by the generator registry
    pub fn from_params(params: &ParamMap, context: &GeneratorContext) -> PlannerResult<Self> {
        let config = RrtConfig::from_params(params)?;
        match context.seed {
            Some(seed) => Self::with_seed(config, context.bounds, context.oracle.clone(), seed),
            None => Self::new(config, context.bounds, context.oracle.clone()),
        }
    }
}

impl<R: Rng + Send> RrtGenerator<R> {
    pub fn with_rng(
        config: RrtConfig,
        bounds: BoundingVolume,
        oracle: Arc<dyn TraversabilityOracle>,
        rng: R,
    ) -> PlannerResult<Self> {
        config.validate()?;
        let sampler = CandidateSampler::new(bounds, config.sampling_policy(), config.maximum_tries);
        Ok(RrtGenerator {
            config,
            sampler,
            index: SegmentIndex::new(),
            oracle,
            rng,
            goal: None,
        })
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    /// Goal remembered by the last successful selection
    pub fn goal(&self) -> Option<Vector3<f64>> {
        self.goal
    }

    /// Rebuild the index if the tree destroyed segments since the last build
    pub fn sync_index(&mut self, tree: &TrajectoryTree) {
        if !self.index.is_current(tree) {
            self.index.rebuild(tree);
        }
    }

    /// Try to attach a new child to `target` heading for `goal`.
    ///
    /// The step is capped at `max_extension_range`, and every discretization
    /// point from the start up to (excluding) the end of the step must be
    /// traversable. Returns the new segment, or `None` without touching the
    /// tree when the extension is blocked or degenerate.
    pub fn extend_towards(
        &mut self,
        tree: &mut TrajectoryTree,
        target: SegmentId,
        goal: &Vector3<f64>,
    ) -> Option<SegmentId> {
        let start = match tree.get(target).and_then(|segment| segment.endpoint()) {
            Some(start) => start,
            None => {
                warn!("cannot extend segment {}: stale or without poses", target);
                return None;
            }
        };

        let mut direction = goal - start;
        let distance = direction.norm();
        if self.config.max_extension_range > 0.0 && distance > self.config.max_extension_range {
            direction *= self.config.max_extension_range / distance;
        }
        let length = direction.norm();
        if length <= f64::EPSILON {
            trace!("goal coincides with segment {}, nothing to extend", target);
            return None;
        }

        let n_checks = step_count(length, self.oracle.resolution());
        for i in 0..n_checks {
            let point = start + direction * (i as f64 / n_checks as f64);
            if !self.oracle.is_traversable(&point) {
                trace!("extension from {} blocked at {:?}", target, point);
                return None;
            }
        }

        let yaw = wrap_angle(self.rng.gen_range(0.0..2.0 * PI));
        let n_poses = step_count(length, self.config.velocity / self.config.sampling_rate);
        let sampling_rate = self.config.sampling_rate;
        let trajectory: Vec<TrajectoryPoint> = (0..=n_poses)
            .map(|i| {
                let position = start + direction * (i as f64 / n_poses as f64);
                let time_ns = (i as f64 / sampling_rate * 1.0e9) as i64;
                TrajectoryPoint::new(position, yaw, time_ns)
            })
            .collect();

        let child = tree.spawn_child(target);
        tree[child].trajectory = trajectory;

        if self.index.is_current(tree) {
            self.index.insert(tree, child);
        } else {
            self.index.rebuild(tree);
        }
        Some(child)
    }

    /// One full iteration: select a target, then expand it.
    pub fn step(&mut self, tree: &mut TrajectoryTree) -> Option<SegmentId> {
        let target = self.select_segment(tree);
        let mut new_segments = Vec::new();
        if self.expand_segment(tree, target, &mut new_segments) {
            new_segments.pop()
        } else {
            None
        }
    }
}

impl<R: Rng + Send> TrajectoryGenerator for RrtGenerator<R> {
    fn name(&self) -> &str {
        RRT_NAME
    }

    /// Sample a traversable goal and return the segment nearest to it.
    ///
    /// The goal is only checked before being clipped to the extension range;
    /// the clipped end of the step is covered by the extension scan instead.
    fn select_segment(&mut self, tree: &TrajectoryTree) -> Option<SegmentId> {
        self.goal = None;
        self.sync_index(tree);

        let tip = tree[tree.root()]
            .endpoint()
            .unwrap_or_else(|| self.sampler.bounds().center());
        let goal = self.sampler.sample(&mut self.rng, &tip, self.oracle.as_ref())?;

        let target = match self.index.nearest(&goal) {
            Some(target) => target,
            None => {
                debug!("segment index is empty, no target for goal {:?}", goal);
                return None;
            }
        };
        self.goal = Some(goal);
        Some(target)
    }

    /// Extend `target` towards the goal of the preceding selection.
    fn expand_segment(
        &mut self,
        tree: &mut TrajectoryTree,
        target: Option<SegmentId>,
        new_segments: &mut Vec<SegmentId>,
    ) -> bool {
        let target = match target {
            Some(target) => target,
            None => return false,
        };
        let goal = match self.goal.take() {
            Some(goal) => goal,
            None => {
                debug!("expand_segment called without a selected goal");
                return false;
            }
        };
        match self.extend_towards(tree, target, &goal) {
            Some(child) => {
                new_segments.push(child);
                true
            }
            None => false,
        }
    }
}
