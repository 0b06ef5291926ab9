//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Linearly interpolate between `a` and `b`.
///
/// A `fraction` of 0 gives `a` and a `fraction` of 1 gives `b`. The fraction is not limited, so
/// values outside [0, 1] extrapolate.
pub fn lerp<T>(a: T, b: T, fraction: T) -> T
where
    T: Float,
{
    a + (b - a) * fraction
}

/// Interpolate between two angles along the shortest arc.
///
/// When the angles are less than pi apart this is identical to [`lerp`]. The result is not
/// wrapped.
pub fn lerp_angle<T>(a: T, b: T, fraction: T) -> T
where
    T: Float + FloatConst,
{
    a + get_ang_dist(a, b) * fraction
}

/// Limit a value to the range [min, max].
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    value.max(min).min(max)
}

/// Get the signed shortest angular distance from `a` to `b`, in the range [-pi, pi].
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float + FloatConst,
{
    normalise_angle(b - a)
}

/// Wrap an angle into the range [-pi, pi].
///
/// Angles already within the range are returned unmodified.
pub fn normalise_angle<T>(angle: T) -> T
where
    T: Float + FloatConst,
{
    let pi = T::PI();
    let tau = pi + pi;

    if angle >= -pi && angle <= pi {
        return angle;
    }

    let mut r = (angle + pi) % tau;
    if r < T::zero() {
        r = r + tau;
    }

    r - pi
}
