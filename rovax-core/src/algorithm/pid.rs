use serde::Deserialize;

use crate::angle::clamp;

/// Proportional integral derivative regulator.
///
/// The regulator holds no state of its own. Error bookkeeping is
/// left to the motion routine driving it, which feeds the error
/// terms back on every update.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pid {
    /// Proportional tuner value.
    pub kp: f64,
    /// Integral tuner value.
    pub ki: f64,
    /// Derivative tuner value.
    pub kd: f64,
    /// Minimum value the regulator will return.
    #[serde(default = "Pid::default_min_velocity")]
    pub min_velocity: f64,
    /// Maximum value the regulator will return.
    #[serde(default = "Pid::default_max_velocity")]
    pub max_velocity: f64,
}

impl Pid {
    /// Construct a regulator with the default velocity bounds.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            min_velocity: Self::default_min_velocity(),
            max_velocity: Self::default_max_velocity(),
        }
    }

    /// Construct a regulator with explicit velocity bounds.
    pub fn with_bounds(kp: f64, ki: f64, kd: f64, min_velocity: f64, max_velocity: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            min_velocity,
            max_velocity,
        }
    }

    fn default_min_velocity() -> f64 {
        0.0
    }

    fn default_max_velocity() -> f64 {
        127.0
    }

    /// Regulator output for the given error terms.
    ///
    /// The result is restricted to the velocity bounds.
    pub fn update(&self, error: f64, total_error: f64, prev_error: f64) -> f64 {
        clamp(
            self.kp * error + self.ki * total_error + self.kd * (error - prev_error),
            self.min_velocity,
            self.max_velocity,
        )
    }

    /// Get the maximum speed of the regulator.
    pub fn max_speed(&self) -> f64 {
        self.max_velocity.abs()
    }

    /// Get the minimum speed of the regulator.
    pub fn min_speed(&self) -> f64 {
        self.min_velocity.abs()
    }
}

impl Default for Pid {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_proportional() {
        let pid = Pid::new(2.0, 0.0, 0.0);
        assert_eq!(pid.update(10.0, 0.0, 0.0), 20.0);
        assert_eq!(pid.update(100.0, 0.0, 0.0), 127.0);
    }

    #[test]
    fn test_update_terms() {
        let pid = Pid::with_bounds(1.0, 0.5, 2.0, -127.0, 127.0);

        // 1*10 + 0.5*40 + 2*(10-16)
        assert_eq!(pid.update(10.0, 40.0, 16.0), 18.0);
        assert_eq!(pid.update(-40.0, 0.0, -40.0), -40.0);
    }

    #[test]
    fn test_update_bounds() {
        let pid = Pid::with_bounds(10.0, 0.0, 0.0, 20.0, 90.0);

        assert_eq!(pid.update(100.0, 0.0, 0.0), 90.0);
        assert_eq!(pid.update(0.1, 0.0, 0.0), 20.0);
        assert_eq!(pid.update(-50.0, 0.0, 0.0), 20.0);
    }

    #[test]
    fn test_speed_bounds() {
        let pid = Pid::with_bounds(1.0, 0.0, 0.0, -15.0, -110.0);
        assert_eq!(pid.max_speed(), 110.0);
        assert_eq!(pid.min_speed(), 15.0);
    }
}
