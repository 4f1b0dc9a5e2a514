//! Bucketing of continuous distances into coarse integer indices.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default bucket width in arena units.
pub const DEFAULT_STEP: f64 = 10.0;

/// Integer floor division of `|value|` by `step`.
pub fn discretize(value: f64, step: f64) -> i64 {
    (value.abs() / step).floor() as i64
}

/// Discretizer with a configurable bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discretizer {
    step: f64,
}

impl Discretizer {
    /// Create a discretizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `step` is finite and positive.
    pub fn new(step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("bucket step must be finite and positive, got {step}"),
            });
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bucket(&self, value: f64) -> i64 {
        discretize(value, self.step)
    }
}

impl Default for Discretizer {
    fn default() -> Self {
        Self { step: DEFAULT_STEP }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_zero_maps_to_zero() {
        assert_eq!(discretize(0.0, DEFAULT_STEP), 0);
        assert_eq!(Discretizer::default().bucket(-0.0), 0);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(discretize(9.99, 10.0), 0);
        assert_eq!(discretize(10.0, 10.0), 1);
        assert_eq!(discretize(29.0, 10.0), 2);
        assert_eq!(discretize(-35.0, 10.0), 3);
        assert_eq!(discretize(35.0, 5.0), 7);
    }

    #[test]
    fn test_monotonic_in_absolute_distance() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let a: f64 = rng.random_range(-800.0..800.0);
            let b: f64 = rng.random_range(-800.0..800.0);
            let (near, far) = if a.abs() <= b.abs() { (a, b) } else { (b, a) };
            assert!(discretize(near, DEFAULT_STEP) <= discretize(far, DEFAULT_STEP));
        }
    }

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(Discretizer::new(0.0).is_err());
        assert!(Discretizer::new(-1.0).is_err());
        assert!(Discretizer::new(f64::NAN).is_err());
        assert_eq!(Discretizer::new(4.0).unwrap().step(), 4.0);
    }
}
