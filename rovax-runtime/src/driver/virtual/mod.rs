use std::sync::atomic::{AtomicI16, Ordering};

pub(crate) mod encoder;
pub(crate) mod hull;
pub(crate) mod inertial;

/// Full scale power value.
const POWER_SCALE: f64 = 127.0;

/// Shared state of the simulated machine.
///
/// The motion device writes the commanded power per actuator, the
/// virtual sensors integrate that power over wall clock time.
pub struct SimState {
    /// Commanded power per actuator.
    power: [AtomicI16; 4],
    /// Top linear speed of the drive base at full power.
    top_speed: f64,
    /// Distance between the drive sides.
    track_width: f64,
}

impl SimState {
    pub fn new(top_speed: f64, track_width: f64) -> Self {
        Self {
            power: [0; 4].map(|_| AtomicI16::new(0)),
            top_speed,
            track_width,
        }
    }

    #[inline]
    pub fn power(&self, actuator: u32) -> i16 {
        self.power
            .get(actuator as usize)
            .map_or(0, |power| power.load(Ordering::Relaxed))
    }

    pub fn set_power(&self, actuator: u32, value: i16) {
        if let Some(power) = self.power.get(actuator as usize) {
            power.store(value, Ordering::Relaxed);
        }
    }

    /// Zero the power of every actuator.
    pub fn halt(&self) {
        for power in &self.power {
            power.store(0, Ordering::Relaxed);
        }
    }

    /// Linear velocity of an actuator at its commanded power.
    pub fn velocity(&self, actuator: u32) -> f64 {
        (self.power(actuator) as f64 / POWER_SCALE) * self.top_speed
    }

    #[inline]
    pub fn track_width(&self) -> f64 {
        self.track_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_power() {
        let state = SimState::new(76.0, 16.0);

        state.set_power(1, 127);
        assert_eq!(state.power(1), 127);
        assert!((state.velocity(1) - 76.0).abs() < 1e-9);

        // Out of range actuators are ignored.
        state.set_power(9, 50);
        assert_eq!(state.power(9), 0);

        state.halt();
        assert_eq!(state.power(1), 0);
    }
}
