use serde::Serialize;

use crate::angle::normalize_angle;

/// A point on the traversal plane.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Get the distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Dot product with another point.
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.distance(other) == 0.0
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X: {:.2} Y: {:.2}", self.x, self.y)
    }
}

/// A pose on the traversal plane.
///
/// The pose extends a plane point with the direction the machine
/// is facing at that point. The heading is always kept within the
/// domain [0,2π), whichever way the pose was constructed or
/// combined.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    heading: f64,
}

impl Pose {
    /// Construct a new pose with the heading in radians.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: normalize_angle(heading),
        }
    }

    /// Construct a new pose with the heading in degrees.
    pub fn from_degrees(x: f64, y: f64, heading: f64) -> Self {
        Self::new(x, y, heading.to_radians())
    }

    /// Get the heading in radians, within [0,2π).
    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Get the heading in degrees.
    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }

    /// Replace the heading, in radians.
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = normalize_angle(heading);
    }

    /// Get the plane point of the pose.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the distance to another pose, ignoring heading.
    pub fn distance(&self, other: &Pose) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl std::ops::Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Self) -> Self::Output {
        Pose::new(self.x + rhs.x, self.y + rhs.y, self.heading + rhs.heading)
    }
}

impl std::ops::Sub for Pose {
    type Output = Pose;

    fn sub(self, rhs: Self) -> Self::Output {
        Pose::new(self.x - rhs.x, self.y - rhs.y, self.heading - rhs.heading)
    }
}

impl PartialEq for Pose {
    fn eq(&self, other: &Self) -> bool {
        self.distance(other) == 0.0
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X: {:.2} Y: {:.2} Heading: {:.3}rad ({:.1}°)",
            self.x,
            self.y,
            self.heading,
            self.heading_degrees()
        )
    }
}

/// Linear interpolation between two poses.
///
/// The parameter runs over [0,1] from the first to the second
/// pose. The heading of the first pose is carried over.
pub fn lerp(pt1: &Pose, pt2: &Pose, t: f64) -> Pose {
    Pose::new(
        pt1.x + (pt2.x - pt1.x) * t,
        pt1.y + (pt2.y - pt1.y) * t,
        pt1.heading,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_point_arithmetic() {
        let sum = Point::new(1.0, 2.0) + Point::new(3.0, 4.0);
        assert_eq!(sum, Point::new(4.0, 6.0));

        let diff = Point::new(1.0, 2.0) - Point::new(3.0, 4.0);
        assert_eq!(diff, Point::new(-2.0, -2.0));

        assert_eq!(Point::new(1.0, 2.0).dot(&Point::new(3.0, 4.0)), 11.0);
    }

    #[test]
    fn test_pose_heading_normal() {
        let pose = Pose::new(0.0, 0.0, 7.0);
        assert!((pose.heading() - (7.0 - TAU)).abs() < 1e-12);

        let mut pose = Pose::default();
        pose.set_heading(-PI / 2.0);
        assert!((pose.heading() - 3.0 * PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pose_arithmetic() {
        let sum = Pose::new(1.0, 2.0, 1.0) + Pose::new(3.0, 4.0, 1.5);
        assert_eq!(sum, Pose::new(4.0, 6.0, 0.0));
        assert!((sum.heading() - 2.5).abs() < 1e-12);

        let diff = Pose::new(1.0, 2.0, 1.0) - Pose::new(3.0, 4.0, 1.5);
        assert_eq!(diff, Pose::new(-2.0, -2.0, 0.0));
        assert!((diff.heading() - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_pose_equality_ignores_heading() {
        assert_eq!(Pose::new(5.0, 5.0, 0.2), Pose::new(5.0, 5.0, 4.1));
        assert_ne!(Pose::new(5.0, 5.0, 0.2), Pose::new(5.0, 5.1, 0.2));
    }

    #[test]
    fn test_pose_distance() {
        let origin = Pose::default();
        assert_eq!(origin.distance(&Pose::new(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn test_lerp() {
        let mid = lerp(&Pose::new(0.0, 0.0, 1.2), &Pose::new(10.0, -4.0, 0.0), 0.5);
        assert_eq!(mid, Pose::new(5.0, -2.0, 0.0));
        assert!((mid.heading() - 1.2).abs() < 1e-12);
    }
}
