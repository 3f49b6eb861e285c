use std::time::Instant;

use rovax_core::motion::ToMotion;
use rovax_core::{Trace, TraceWriter};

use crate::device::{DeviceDescriptor, MotionDevice};

/// Forwards motion instructions to the motion device.
///
/// Every instruction passes the tracer before it reaches the device.
/// With motion disabled the instruction is recorded and dropped, which
/// leaves the machine frozen while the programs run as usual.
pub struct MotionPublisher<D, W> {
    motion_device: DeviceDescriptor<D>,
    trace: W,
    /// Whether or not to enable the motion device.
    motion_enabled: bool,
    start: Instant,
}

impl<D: MotionDevice, W: TraceWriter> MotionPublisher<D, W> {
    pub fn new(motion_device: DeviceDescriptor<D>, trace: W, motion_enabled: bool) -> Self {
        if !motion_enabled {
            info!("Motion device is disabled: no motion commands will be issued");
        }

        Self {
            motion_device,
            trace,
            motion_enabled,
            start: Instant::now(),
        }
    }

    pub async fn publish<T: ToMotion>(&mut self, motion: T) {
        let motion = motion.to_motion();

        motion.record(&mut self.trace, self.start.elapsed());

        if self.motion_enabled {
            trace!("Publish motion: {:?}", motion);

            self.motion_device.lock().await.actuate(motion).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rovax_core::motion::Motion;

    use super::*;
    use crate::driver::{SimState, VirtualHull};
    use crate::runtime::trace::{NullTracer, NullTracerInstance};
    use rovax_core::Tracer;

    #[tokio::test]
    async fn test_publish() {
        let state = Arc::new(SimState::new(76.0, 16.0));
        let hull = Arc::new(tokio::sync::Mutex::new(VirtualHull::new(state.clone())));

        let mut publisher =
            MotionPublisher::new(hull, NullTracer::from_path(".").instance("motion"), true);

        publisher.publish(Motion::Change(vec![(0, 32)])).await;
        assert_eq!(state.power(0), 32);
    }

    #[tokio::test]
    async fn test_publish_disabled() {
        let state = Arc::new(SimState::new(76.0, 16.0));
        let hull = Arc::new(tokio::sync::Mutex::new(VirtualHull::new(state.clone())));

        let mut publisher: MotionPublisher<VirtualHull, NullTracerInstance> =
            MotionPublisher::new(hull, NullTracerInstance, false);

        publisher.publish(Motion::Change(vec![(0, 32)])).await;
        assert_eq!(state.power(0), 0);
    }
}
