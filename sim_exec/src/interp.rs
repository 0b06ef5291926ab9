//! # Pose Interpolation
//!
//! Finds the point on a trajectory at a given time since the trajectory's reference timestamp.
//!
//! Between two trajectory points every field is linearly interpolated, with heading taken along
//! the shorter arc. Outside the trajectory nothing is extrapolated: before the first point the
//! first point is returned unchanged, and after the last point the last point is held, which is
//! how the vehicle comes to rest at the end of a plan.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::planning::{PathPoint, TrajectoryPoint};
use util::maths::{clamp, lerp, lerp_angle, normalise_angle};

use crate::traj_store::Trajectory;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the trajectory point at `elapsed_s` seconds after the trajectory's reference time.
pub fn interpolate(traj: &Trajectory, elapsed_s: f64) -> TrajectoryPoint {
    let points = traj.points();
    let first = traj.first();
    let last = traj.last();

    if elapsed_s <= first.relative_time {
        return *first;
    }
    if elapsed_s >= last.relative_time {
        return *last;
    }

    // Index of the first point strictly after the elapsed time. The checks above guarantee this
    // is in 1..len.
    let next = points.partition_point(|p| p.relative_time <= elapsed_s);
    let (p0, p1) = (&points[next - 1], &points[next]);

    let fraction = clamp(
        (elapsed_s - p0.relative_time) / (p1.relative_time - p0.relative_time),
        0.0,
        1.0,
    );

    let mut point = lerp_point(p0, p1, fraction);
    point.relative_time = elapsed_s;
    point
}

/// Interpolate every field between two points, `fraction` in [0, 1].
pub fn lerp_point(p0: &TrajectoryPoint, p1: &TrajectoryPoint, fraction: f64) -> TrajectoryPoint {
    let (a, b) = (&p0.path_point, &p1.path_point);

    TrajectoryPoint {
        path_point: PathPoint {
            x: lerp(a.x, b.x, fraction),
            y: lerp(a.y, b.y, fraction),
            s: lerp(a.s, b.s, fraction),
            theta: normalise_angle(lerp_angle(a.theta, b.theta, fraction)),
            kappa: lerp(a.kappa, b.kappa, fraction),
        },
        v: lerp(p0.v, p1.v, fraction),
        a: lerp(p0.a, p1.a, fraction),
        relative_time: lerp(p0.relative_time, p1.relative_time, fraction),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    const TOL: f64 = 1e-6;

    fn assert_near(a: f64, b: f64) {
        assert!((a - b).abs() < TOL, "{} is not near {}", a, b);
    }

    fn pt(t: f64, x: f64, y: f64, s: f64, theta: f64, kappa: f64, v: f64, a: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            path_point: PathPoint {
                x,
                y,
                s,
                theta,
                kappa,
            },
            v,
            a,
            relative_time: t,
        }
    }

    fn five_point_traj() -> Trajectory {
        Trajectory::new(
            0.0,
            vec![
                pt(0.0, 0.0, 0.0, 0.0, 0.1, 0.01, 10.0, 1.0),
                pt(0.1, 1.0, 2.0, 1.5, 0.3, 0.03, 11.0, 0.5),
                pt(0.2, 2.0, 4.0, 3.0, 0.5, 0.05, 12.0, 0.0),
                pt(0.3, 3.0, 6.0, 4.5, 0.7, 0.07, 13.0, -0.5),
                pt(0.4, 4.0, 8.0, 6.0, 0.9, 0.09, 14.0, -1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_interior_point() {
        let traj = five_point_traj();
        let (p0, p1) = (&traj.points()[0], &traj.points()[1]);

        let p = interpolate(&traj, 0.01);

        let expect = |a: f64, b: f64| a + (b - a) * 0.1;
        assert_near(p.path_point.x, expect(p0.path_point.x, p1.path_point.x));
        assert_near(p.path_point.y, expect(p0.path_point.y, p1.path_point.y));
        assert_near(p.path_point.s, expect(p0.path_point.s, p1.path_point.s));
        assert_near(p.path_point.theta, expect(p0.path_point.theta, p1.path_point.theta));
        assert_near(p.path_point.kappa, expect(p0.path_point.kappa, p1.path_point.kappa));
        assert_near(p.v, expect(p0.v, p1.v));
        assert_near(p.a, expect(p0.a, p1.a));
        assert_near(p.relative_time, 0.01);
    }

    #[test]
    fn test_later_segment() {
        let traj = five_point_traj();

        // Three quarters of the way between points 2 and 3
        let p = interpolate(&traj, 0.275);
        assert_near(p.path_point.x, 2.75);
        assert_near(p.path_point.y, 5.5);
        assert_near(p.v, 12.75);
        assert_near(p.a, -0.375);

        // Exactly on an interior point
        let p = interpolate(&traj, 0.2);
        assert_near(p.path_point.x, 2.0);
        assert_near(p.v, 12.0);
    }

    #[test]
    fn test_boundaries_hold() {
        let traj = five_point_traj();

        assert_eq!(interpolate(&traj, -5.0), *traj.first());
        assert_eq!(interpolate(&traj, 0.0), *traj.first());
        assert_eq!(interpolate(&traj, 0.4), *traj.last());
        assert_eq!(interpolate(&traj, 100.0), *traj.last());
    }

    #[test]
    fn test_single_point() {
        let only = pt(0.5, 3.0, 4.0, 0.0, FRAC_PI_4, 0.0, 2.0, 0.0);
        let traj = Trajectory::new(0.0, vec![only]).unwrap();

        for t in &[-1.0, 0.0, 0.5, 0.6, 1000.0] {
            assert_eq!(interpolate(&traj, *t), only);
        }
    }

    #[test]
    fn test_heading_wrap() {
        let traj = Trajectory::new(
            0.0,
            vec![
                pt(0.0, 0.0, 0.0, 0.0, PI - 0.1, 0.0, 1.0, 0.0),
                pt(1.0, 0.0, 0.0, 0.0, -PI + 0.1, 0.0, 1.0, 0.0),
            ],
        )
        .unwrap();

        // Half way turns through pi rather than back through zero
        let p = interpolate(&traj, 0.5);
        assert_near(p.path_point.theta.cos(), -1.0);
    }

    #[test]
    fn test_heading_wrapped() {
        let traj = Trajectory::new(
            0.0,
            vec![
                pt(0.0, 0.0, 0.0, 0.0, 3.1, 0.0, 1.0, 0.0),
                pt(1.0, 0.0, 0.0, 0.0, -3.1, 0.0, 1.0, 0.0),
            ],
        )
        .unwrap();

        // Past pi the heading comes back in from -pi
        let p = interpolate(&traj, 0.75);
        let theta = p.path_point.theta;
        assert!(theta >= -PI && theta <= PI);
        assert_near(theta, 3.1 + (2.0 * PI - 6.2) * 0.75 - 2.0 * PI);

        for i in 0..=20 {
            let theta = interpolate(&traj, i as f64 * 0.05).path_point.theta;
            assert!(theta >= -PI && theta <= PI);
        }
    }
}
