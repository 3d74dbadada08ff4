//! # Steering law
//!
//! Proportional steering towards the first point of the planned path:
//!
//! ```text
//! target = gain * y / x
//! ```
//!
//! where `(x, y)` is the point in the vehicle frame. The demand is then slew
//! limited so it moves by at most `max_step` each cycle, which smooths over
//! jumps between consecutive noisy paths.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use util::maths::step_towards;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The proportional steering law.
#[derive(Debug, Clone, Copy)]
pub struct SteerLaw {
    /// Proportional gain on the y/x ratio
    pub gain: f64,

    /// Maximum change in steering per cycle
    pub max_step: f64,
}

/// The result of one application of the steering law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerStep {
    /// Steering demand after slew limiting
    pub steering: f64,

    /// Unlimited target demand
    pub target: f64,

    /// True if the slew limit was applied this cycle
    pub rate_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SteerLawError {
    /// The target point has no forward distance, or its ratio is not finite.
    #[error("Degenerate target point ({0}, {1})")]
    DegenerateInput(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerLaw {
    pub fn new(gain: f64, max_step: f64) -> Self {
        Self { gain, max_step }
    }

    /// Get the unlimited steering target for the given path point.
    pub fn target(&self, point_m: &Vector2<f64>) -> Result<f64, SteerLawError> {
        let (x, y) = (point_m[0], point_m[1]);

        if x == 0.0 {
            return Err(SteerLawError::DegenerateInput(x, y));
        }

        let target = self.gain * (y / x);

        if target.is_finite() {
            Ok(target)
        } else {
            Err(SteerLawError::DegenerateInput(x, y))
        }
    }

    /// Step the current steering demand towards the target for the given
    /// path point.
    ///
    /// On error the caller should keep its current steering.
    pub fn step(&self, current: f64, point_m: &Vector2<f64>) -> Result<SteerStep, SteerLawError> {
        let target = self.target(point_m)?;
        let steering = step_towards(current, target, self.max_step);

        Ok(SteerStep {
            steering,
            target,
            rate_limited: steering != target,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_converges_in_steps() {
        let law = SteerLaw::new(1.0, 0.1);
        let point = Vector2::new(2.0, 1.0);

        let first = law.step(0.0, &point).unwrap();
        assert_eq!(first.target, 0.5);
        assert_eq!(first.steering, 0.1);
        assert!(first.rate_limited);

        let second = law.step(first.steering, &point).unwrap();
        assert!((second.steering - 0.2).abs() < EPS);

        let mut steering = 0.0;
        for _ in 0..5 {
            steering = law.step(steering, &point).unwrap().steering;
        }
        assert!((steering - 0.5).abs() < EPS);

        // Once converged the target is held exactly
        let held = law.step(steering, &point).unwrap();
        assert_eq!(held.steering, 0.5);
        assert!(!held.rate_limited);
    }

    #[test]
    fn test_negative_and_gain() {
        let law = SteerLaw::new(0.5, 0.1);

        // Target right of the vehicle
        let step = law.step(0.0, &Vector2::new(1.0, -0.1)).unwrap();
        assert!((step.target + 0.05).abs() < EPS);
        assert_eq!(step.steering, step.target);

        let step = law.step(0.0, &Vector2::new(1.0, -4.0)).unwrap();
        assert_eq!(step.target, -2.0);
        assert_eq!(step.steering, -0.1);
    }

    #[test]
    fn test_degenerate_input() {
        let law = SteerLaw::new(1.0, 0.1);

        assert_eq!(
            law.step(0.3, &Vector2::new(0.0, 1.0)),
            Err(SteerLawError::DegenerateInput(0.0, 1.0))
        );
        assert!(law.step(0.3, &Vector2::new(-0.0, 1.0)).is_err());
        assert!(law.step(0.3, &Vector2::new(std::f64::NAN, 1.0)).is_err());
        assert!(law.step(0.3, &Vector2::new(1e-320, 1e10)).is_err());
    }

    #[test]
    fn test_rate_bound() {
        let law = SteerLaw::new(1.0, 0.1);

        let mut current = -0.8;
        for &(x, y) in [(1.0, 3.0), (0.5, -2.0), (4.0, 0.1), (1.0, 0.0), (0.1, 10.0)].iter() {
            let next = law.step(current, &Vector2::new(x, y)).unwrap().steering;
            assert!((next - current).abs() <= 0.1 + EPS);
            current = next;
        }
    }
}
