use std::sync::Arc;
use std::time::Instant;

use rovax_core::metric::MetricValue;

use crate::device::{Device, MetricDevice};

use super::SimState;

const DEVICE_NAME: &str = "imu";
const DEVICE_ADDR: u16 = 0x7;

/// Virtual inertial unit.
///
/// Integrates the differential of the drive side velocities into an
/// absolute heading. The sensor frame runs opposite to the pose frame,
/// a counterclockwise turn decreases the reading.
pub struct VirtualInertial {
    state: Arc<SimState>,
    right_actuator: u32,
    left_actuator: u32,
    /// Heading in the sensor frame, radians.
    raw: f64,
    last: Instant,
}

impl VirtualInertial {
    pub fn new(state: Arc<SimState>, right_actuator: u32, left_actuator: u32) -> Self {
        Self {
            state,
            right_actuator,
            left_actuator,
            raw: 0.0,
            last: Instant::now(),
        }
    }

    /// Seed the sensor frame heading.
    pub fn set_heading(&mut self, raw: f64) {
        self.raw = raw;
        self.last = Instant::now();
    }
}

impl Device for VirtualInertial {
    fn name(&self) -> String {
        DEVICE_NAME.to_owned()
    }
}

#[async_trait::async_trait]
impl MetricDevice for VirtualInertial {
    async fn next(&mut self) -> Option<(u16, MetricValue)> {
        let elapsed = self.last.elapsed().as_secs_f64();
        self.last = Instant::now();

        let yaw_rate = (self.state.velocity(self.right_actuator)
            - self.state.velocity(self.left_actuator))
            / self.state.track_width();

        self.raw -= yaw_rate * elapsed;

        Some((DEVICE_ADDR, MetricValue::Heading(self.raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counterclockwise_turn_decreases_raw() {
        let state = Arc::new(SimState::new(100.0, 16.0));
        // Right side forwards, left side backwards: counterclockwise.
        state.set_power(1, 127);
        state.set_power(0, -127);

        let mut imu = VirtualInertial::new(state, 1, 0);
        imu.set_heading(1.0);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        match imu.next().await {
            Some((address, MetricValue::Heading(heading))) => {
                assert_eq!(address, DEVICE_ADDR);
                assert!(heading < 1.0);
            }
            _ => panic!("expected a heading"),
        }
    }
}
