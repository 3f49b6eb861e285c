use std::sync::Arc;

use rovax_core::motion::Motion;

use crate::device::{Device, MotionDevice};

use super::SimState;

const DEVICE_NAME: &str = "hull";

/// Virtual drive unit.
///
/// Applies motion instructions onto the shared simulation state.
pub struct VirtualHull {
    state: Arc<SimState>,
}

impl VirtualHull {
    pub fn new(state: Arc<SimState>) -> Self {
        Self { state }
    }
}

impl Device for VirtualHull {
    fn name(&self) -> String {
        DEVICE_NAME.to_owned()
    }
}

#[async_trait::async_trait]
impl MotionDevice for VirtualHull {
    async fn actuate(&mut self, motion: Motion) {
        match motion {
            Motion::StopAll => {
                trace!("Stop all actuators");

                self.state.halt();
            }
            Motion::Stop(actuators) => {
                for actuator in actuators {
                    trace!("Stop actuator {}", actuator);

                    self.state.set_power(actuator, 0);
                }
            }
            Motion::Change(actuators) => {
                for (actuator, value) in actuators {
                    trace!("Change actuator {} to value {}", actuator, value);

                    self.state.set_power(actuator, value);
                }
            }
        }
    }

    async fn halt(&mut self) {
        self.state.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_actuate() {
        let state = Arc::new(SimState::new(76.0, 16.0));
        let mut hull = VirtualHull::new(state.clone());

        hull.actuate(Motion::Change(vec![(0, 64), (1, -64)])).await;
        assert_eq!(state.power(0), 64);
        assert_eq!(state.power(1), -64);

        hull.actuate(Motion::Stop(vec![0])).await;
        assert_eq!(state.power(0), 0);
        assert_eq!(state.power(1), -64);

        hull.actuate(Motion::StopAll).await;
        assert_eq!(state.power(1), 0);
    }
}
