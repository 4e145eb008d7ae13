//! Scalar interpolation and easing curves.
//!
//! Tweens in this crate take a progress value `t` supplied by the caller.
//! An [`Easing`] reshapes that value before it reaches [`lerp`] or
//! [`Quaternion::slerp`](crate::Quaternion::slerp).

use serde::{Deserialize, Serialize};

/// Linear interpolation. `t` is not clamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Easing curves for tween progress.
///
/// Every curve lands on `1` at `t = 1` (`Berp` within 1e-4). `Berp` overshoots on the way and
/// `Bounce` starts part of the way in, so neither is monotonic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Cubic Hermite: slow start, slow finish.
    Hermite,
    /// Quarter sine: fast start, slow finish.
    Sinerp,
    /// Decaying bounce that settles on the target.
    Bounce,
    /// Overshoots the target and springs back.
    Berp,
    /// `3t² - 2t³`.
    SmoothStep,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f64) -> f64 {
        use std::f64::consts::PI;

        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Hermite => t * t * (3.0 - 2.0 * t),
            Easing::Sinerp => (t * PI * 0.5).sin(),
            Easing::Bounce => 1.0 - ((5.5 * (t + 1.0).powi(2)).sin() * (1.0 - t)).abs(),
            Easing::Berp => {
                ((t * PI * (0.2 + 2.5 * t * t * t)).sin() * (1.01 - t).powf(2.2) + t)
                    * (1.0 + 1.2 * (1.0 - t))
            }
            Easing::SmoothStep => -2.0 * t * t * t + 3.0 * t * t,
        }
    }

    /// Eases `t` and interpolates between `a` and `b`.
    pub fn lerp(&self, a: f64, b: f64, t: f64) -> f64 {
        lerp(a, b, self.apply(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::Hermite,
        Easing::Sinerp,
        Easing::Bounce,
        Easing::Berp,
        Easing::SmoothStep,
    ];

    #[test]
    fn lerp_is_affine_and_unclamped() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
        assert_eq!(lerp(10.0, 20.0, 2.0), 30.0);
    }

    #[test]
    fn curves_start_at_zero() {
        for easing in ALL.into_iter().filter(|e| *e != Easing::Bounce) {
            let v = easing.apply(0.0);
            assert!(v.abs() < 1e-12, "{easing:?}: {v}");
        }
        assert!(Easing::Bounce.apply(0.0) > 0.2);
    }

    #[test]
    fn curves_end_at_one() {
        for easing in ALL {
            let v = easing.apply(1.0);
            assert!((v - 1.0).abs() < 1e-4, "{easing:?}: {v}");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn smoothing_curves_are_symmetric_at_midpoint() {
        assert!((Easing::Hermite.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((Easing::SmoothStep.apply(0.5) - 0.5).abs() < 1e-12);
        assert!(Easing::Sinerp.apply(0.5) > 0.5);
    }

    #[test]
    fn eased_lerp() {
        assert_eq!(Easing::Linear.lerp(0.0, 8.0, 0.5), 4.0);
        assert_eq!(Easing::Hermite.lerp(0.0, 8.0, 1.0), 8.0);
    }

    #[test]
    fn easing_deserializes_from_snake_case() {
        let e: Easing = serde_json::from_str("\"smooth_step\"").unwrap();
        assert_eq!(e, Easing::SmoothStep);
    }
}
