use crate::angle::signum;
use crate::position::Pose;

/// Curvature of the circle intersecting three points.
///
/// Returns 1 / radius of the circle. Whenever the points are
/// collinear, or close enough to collinear that no circle center
/// can be resolved, the curvature is 0.
pub fn curvature(pt1: &Pose, pt2: &Pose, pt3: &Pose) -> f64 {
    // Segment midpoints.
    let mx1 = (pt1.x + pt2.x) / 2.0;
    let my1 = (pt1.y + pt2.y) / 2.0;
    let mx2 = (pt2.x + pt3.x) / 2.0;
    let my2 = (pt2.y + pt3.y) / 2.0;

    // Segment slopes and their perpendicular bisector slopes.
    let slope1 = (pt2.y - pt1.y) / (pt2.x - pt1.x);
    let slope2 = (pt3.y - pt2.y) / (pt3.x - pt2.x);

    let perp_slope1 = -1.0 / slope1;
    let perp_slope2 = -1.0 / slope2;

    if !slope1.is_finite()
        || !slope2.is_finite()
        || !perp_slope1.is_finite()
        || !perp_slope2.is_finite()
    {
        return 0.0;
    }

    if (perp_slope1 - perp_slope2).abs() < 1e-6 {
        return 0.0;
    }

    // Intercepts of the perpendicular bisectors, then the circle center.
    let b1 = my1 - perp_slope1 * mx1;
    let b2 = my2 - perp_slope2 * mx2;

    let center_x = (b2 - b1) / (perp_slope1 - perp_slope2);
    let center_y = perp_slope1 * center_x + b1;

    let radius = ((pt1.x - center_x).powi(2) + (pt1.y - center_y).powi(2)).sqrt();

    1.0 / radius
}

/// Signed curvature of the arc from a pose towards a point.
///
/// The arc leaves the starting pose along its heading and ends on
/// the target point. The sign tells which side the target lies on
/// relative to the heading line.
pub fn directional_curvature(start: &Pose, end: &Pose) -> f64 {
    // Which side of the heading line the target is on.
    let side = signum(
        start.heading().sin() * (end.x - start.x) - start.heading().cos() * (end.y - start.y),
    );

    // Distance from the target to the heading line, written as
    // ax + by + c = 0 with b = 1.
    let a = -start.heading().tan();
    let c = start.heading().tan() * start.x - start.y;
    let x = (a * end.x + end.y + c).abs() / ((a * a) + 1.0).sqrt();

    let chord = (end.x - start.x).hypot(end.y - start.y);

    side * ((2.0 * x) / (chord * chord))
}

/// Intersection of a circle around the current pose with a route segment.
///
/// The circle is centered on `curr` with the lookahead distance as its
/// radius. Returns the parameter along the segment from `prev` to `nxt`
/// at which the circle first crosses it, or `None` when the segment is
/// out of reach.
pub fn circle_intersection(
    nxt: &Pose,
    prev: &Pose,
    curr: &Pose,
    lookahead_distance: f64,
) -> Option<f64> {
    let dir = nxt.point() - prev.point();
    let fro = prev.point() - curr.point();

    let a = dir.dot(&dir);
    let b = 2.0 * fro.dot(&dir);
    let c = fro.dot(&fro) - lookahead_distance * lookahead_distance;
    let discrim = b * b - 4.0 * a * c;

    if discrim > 0.0 {
        let discrim = discrim.sqrt();
        let s1 = (-b + discrim) / (2.0 * a);
        let s2 = (-b - discrim) / (2.0 * a);

        if (0.0..=1.0).contains(&s1) {
            Some(s1)
        } else if (0.0..=1.0).contains(&s2) {
            Some(s2)
        } else {
            None
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_curvature_collinear() {
        let pt1 = Pose::new(1.0, 1.0, 0.0);
        let pt2 = Pose::new(2.0, 2.0, 0.0);
        let pt3 = Pose::new(3.0, 3.0, 0.0);
        assert_eq!(curvature(&pt1, &pt2, &pt3), 0.0);
    }

    #[test]
    fn test_curvature_degenerate() {
        let pt = Pose::new(4.0, -2.0, 0.0);
        assert_eq!(curvature(&pt, &pt, &pt), 0.0);

        // Vertical segment resolves to no curvature.
        let pt1 = Pose::new(1.0, 0.0, 0.0);
        let pt2 = Pose::new(1.0, 5.0, 0.0);
        let pt3 = Pose::new(3.0, 6.0, 0.0);
        assert_eq!(curvature(&pt1, &pt2, &pt3), 0.0);
    }

    #[test]
    fn test_curvature_known_circle() {
        // Points on a circle of radius 5 around the origin.
        let pt1 = Pose::new(3.0, 4.0, 0.0);
        let pt2 = Pose::new(0.0, 5.0, 0.0);
        let pt3 = Pose::new(-4.0, 3.0, 0.0);
        assert!((curvature(&pt1, &pt2, &pt3) - 1.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_directional_curvature() {
        let start = Pose::new(0.0, 0.0, PI / 2.0);

        // Target left of the heading line bends one way, right the other.
        let left = directional_curvature(&start, &Pose::new(-2.0, 2.0, 0.0));
        let right = directional_curvature(&start, &Pose::new(2.0, 2.0, 0.0));
        assert!((left + 0.5).abs() < 1e-6);
        assert!((right - 0.5).abs() < 1e-6);

        // Target dead ahead on the heading line.
        let ahead = directional_curvature(&Pose::new(0.0, 0.0, 0.0), &Pose::new(5.0, 0.0, 0.0));
        assert_eq!(ahead, 0.0);
    }

    #[test]
    fn test_circle_intersection() {
        let prev = Pose::new(0.0, 0.0, 0.0);
        let nxt = Pose::new(10.0, 0.0, 0.0);

        let s = circle_intersection(&nxt, &prev, &Pose::new(5.0, 0.0, 0.0), 2.0);
        assert!((s.unwrap() - 0.7).abs() < 1e-9);

        // Out of reach of the segment.
        assert_eq!(
            circle_intersection(&nxt, &prev, &Pose::new(5.0, 50.0, 0.0), 2.0),
            None
        );

        // Circle swallowing the whole segment has no crossing.
        assert_eq!(
            circle_intersection(&nxt, &prev, &Pose::new(5.0, 0.0, 0.0), 50.0),
            None
        );

        // Degenerate segment.
        assert_eq!(
            circle_intersection(&prev, &prev, &Pose::new(5.0, 0.0, 0.0), 2.0),
            None
        );
    }
}
