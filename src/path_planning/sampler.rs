//! Candidate goal sampling inside the bounding volume

use log::trace;
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::Uniform;

use crate::common::{BoundingVolume, TraversabilityOracle};

/// How a raw goal candidate is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingPolicy {
    /// Uniform over the bounding box, each axis independently
    UniformBox,
    /// Uniform offset around the current tree tip, scaled by the box diagonal,
    /// kept only if it falls inside the box
    BiasedSpherical,
}

/// Draws traversable goal points under a retry budget
#[derive(Debug, Clone)]
pub struct CandidateSampler {
    bounds: BoundingVolume,
    policy: SamplingPolicy,
    maximum_tries: usize,
    box_axes: [Uniform<f64>; 3],
    offset: Uniform<f64>,
}

impl CandidateSampler {
    /// `maximum_tries == 0` retries until a candidate is accepted.
    ///
    /// `bounds` is validated on construction, so the per-axis ranges and the
    /// offset radius are always finite and non-inverted.
    pub fn new(bounds: BoundingVolume, policy: SamplingPolicy, maximum_tries: usize) -> Self {
        let (min, max) = (bounds.min(), bounds.max());
        let box_axes = [0usize, 1, 2].map(|axis| Uniform::new_inclusive(min[axis], max[axis]));
        let radius = bounds.diagonal();
        CandidateSampler {
            bounds,
            policy,
            maximum_tries,
            box_axes,
            offset: Uniform::new_inclusive(-radius, radius),
        }
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    pub fn maximum_tries(&self) -> usize {
        self.maximum_tries
    }

    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// One raw draw. `None` if the spherical draw left the bounding volume.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, tip: &Vector3<f64>) -> Option<Vector3<f64>> {
        match self.policy {
            SamplingPolicy::UniformBox => Some(Vector3::new(
                rng.sample(&self.box_axes[0]),
                rng.sample(&self.box_axes[1]),
                rng.sample(&self.box_axes[2]),
            )),
            SamplingPolicy::BiasedSpherical => {
                let candidate = tip
                    + Vector3::new(
                        rng.sample(&self.offset),
                        rng.sample(&self.offset),
                        rng.sample(&self.offset),
                    );
                Some(candidate).filter(|c| self.bounds.contains(c))
            }
        }
    }

    /// Draw until the oracle accepts a candidate or the try budget runs out.
    ///
    /// Every draw counts as one attempt, including spherical draws rejected
    /// for leaving the box (those never reach the oracle).
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tip: &Vector3<f64>,
        oracle: &dyn TraversabilityOracle,
    ) -> Option<Vector3<f64>> {
        let mut attempts = 0;
        while self.maximum_tries == 0 || attempts < self.maximum_tries {
            attempts += 1;
            let candidate = match self.draw(rng, tip) {
                Some(candidate) => candidate,
                None => continue,
            };
            if oracle.is_traversable(&candidate) {
                return Some(candidate);
            }
        }
        trace!("no traversable candidate after {} attempts", attempts);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOracle {
        calls: AtomicUsize,
        accept_after: usize,
    }

    impl CountingOracle {
        fn new(accept_after: usize) -> Self {
            Self { calls: AtomicUsize::new(0), accept_after }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TraversabilityOracle for CountingOracle {
        fn is_traversable(&self, _point: &Vector3<f64>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst) + 1 > self.accept_after
        }

        fn resolution(&self) -> f64 {
            0.1
        }
    }

    fn bounds() -> BoundingVolume {
        BoundingVolume::from_array([-5.0, 5.0, 0.0, 20.0, 1.0, 3.0]).unwrap()
    }

    #[test]
    fn test_uniform_draws_stay_in_box() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::UniformBox, 10);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..2000 {
            let p = sampler.draw(&mut rng, &Vector3::zeros()).unwrap();
            assert!(bounds().contains(&p), "{:?} outside", p);
        }
    }

    #[test]
    fn test_spherical_draws_near_tip_or_rejected() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::BiasedSpherical, 10);
        let mut rng = StdRng::seed_from_u64(2);
        let tip = Vector3::new(0.0, 10.0, 2.0);
        let radius = bounds().diagonal();
        let mut accepted = 0;
        for _ in 0..20000 {
            if let Some(p) = sampler.draw(&mut rng, &tip) {
                accepted += 1;
                assert!(bounds().contains(&p));
                assert!((p - tip).amax() <= radius);
            }
        }
        assert!(accepted > 0 && accepted < 20000);
    }

    #[test]
    fn test_budget_is_exact() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::UniformBox, 3);
        let oracle = CountingOracle::new(usize::MAX);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sampler.sample(&mut rng, &Vector3::zeros(), &oracle).is_none());
        assert_eq!(oracle.calls(), 3);
    }

    #[test]
    fn test_accepts_first_traversable() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::UniformBox, 10);
        let oracle = CountingOracle::new(4);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(sampler.sample(&mut rng, &Vector3::zeros(), &oracle).is_some());
        assert_eq!(oracle.calls(), 5);
    }

    #[test]
    fn test_unlimited_budget_keeps_trying() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::UniformBox, 0);
        let oracle = CountingOracle::new(5000);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(sampler.sample(&mut rng, &Vector3::zeros(), &oracle).is_some());
        assert_eq!(oracle.calls(), 5001);
    }

    #[test]
    fn test_spherical_rejections_consume_budget() {
        // tip farther from the box than the offset radius
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::BiasedSpherical, 50);
        let oracle = CountingOracle::new(usize::MAX);
        let mut rng = StdRng::seed_from_u64(6);
        let tip = Vector3::new(1000.0, 1000.0, 1000.0);
        assert!(sampler.sample(&mut rng, &tip, &oracle).is_none());
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let sampler = CandidateSampler::new(bounds(), SamplingPolicy::UniformBox, 10);
        let oracle = CountingOracle::new(0);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                sampler.sample(&mut a, &Vector3::zeros(), &oracle),
                sampler.sample(&mut b, &Vector3::zeros(), &oracle)
            );
        }
    }
}
