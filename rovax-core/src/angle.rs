use std::f64::consts::{PI, TAU};

/// Normalize an angle to the domain [0,2π).
pub fn normalize_angle(angle: f64) -> f64 {
    ((angle % TAU) + TAU) % TAU
}

/// Normalize an angle to the domain [0,360).
pub fn normalize_angle_degrees(angle: f64) -> f64 {
    ((angle % 360.0) + 360.0) % 360.0
}

/// Shortest rotation from a starting angle towards a target angle.
///
/// The result is signed and bound to [-π,π]. The target angle is
/// normalized before the rotation is taken so any angle is accepted.
pub fn shortest_angle(start: f64, target: f64) -> f64 {
    let error = normalize_angle(target) - start;
    error - (error / TAU).round() * TAU
}

/// Rotation direction from one heading onto another.
///
/// Returns -1 or 1, never 0. Whenever both headings are opposite
/// to each other either direction is as short, in which case -1
/// is returned.
pub fn direction(init_heading: f64, des_heading: f64) -> i32 {
    let mut diff = normalize_angle(des_heading) - normalize_angle(init_heading);

    if diff < -PI {
        diff += TAU;
    }
    if diff > PI {
        diff -= TAU;
    }

    if diff > 0.0 {
        -1
    } else {
        1
    }
}

/// Evaluate whether a number is above, below or at zero.
pub fn signum(num: f64) -> f64 {
    ((num > 0.0) as i32 - (num < 0.0) as i32) as f64
}

/// Restrict a number to the range [min,max].
pub fn clamp(num: f64, min: f64, max: f64) -> f64 {
    min.max(num.min(max))
}
