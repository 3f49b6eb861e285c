use std::sync::Arc;
use std::time::Instant;

use rand::Rng;

use rovax_core::metric::MetricValue;

use crate::device::{Device, DeviceError, MetricDevice, Result};

use super::SimState;

pub(crate) const RIGHT_ADDR: u16 = 0x9;
pub(crate) const LEFT_ADDR: u16 = 0xA;
pub(crate) const BACK_ADDR: u16 = 0xB;
pub(crate) const FRONT_ADDR: u16 = 0xC;

/// Virtual tracking wheel sensor.
///
/// Integrates the commanded power of its actuator over wall clock time
/// into a raw sensor count. A sensor without an actuator, such as a
/// perpendicular tracking wheel on a differential base, never counts.
pub struct VirtualEncoder {
    state: Arc<SimState>,
    rng: rand::rngs::OsRng,
    /// Actuator driving this wheel, if any.
    actuator: Option<u32>,
    address: u16,
    /// Raw counts per distance unit.
    resolution: f64,
    jitter: bool,
    count: f64,
    last: Instant,
}

impl VirtualEncoder {
    pub fn new(
        state: Arc<SimState>,
        actuator: Option<u32>,
        address: u16,
        resolution: f64,
        jitter: bool,
    ) -> Self {
        Self {
            state,
            rng: rand::rngs::OsRng,
            actuator,
            address,
            resolution,
            jitter,
            count: 0.0,
            last: Instant::now(),
        }
    }

    /// Zero the sensor count.
    pub fn reset(&mut self) {
        self.count = 0.0;
        self.last = Instant::now();
    }
}

#[async_trait::async_trait]
impl Device for VirtualEncoder {
    fn name(&self) -> String {
        format!("encoder:0x{:X}", self.address)
    }

    async fn probe(&mut self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(DeviceError::invalid_input(self.name()));
        }

        self.last = Instant::now();

        Ok(())
    }
}

#[async_trait::async_trait]
impl MetricDevice for VirtualEncoder {
    async fn next(&mut self) -> Option<(u16, MetricValue)> {
        let elapsed = self.last.elapsed().as_secs_f64();
        self.last = Instant::now();

        if let Some(actuator) = self.actuator {
            let distance = self.state.velocity(actuator) * elapsed;
            self.count += distance * self.resolution;
        }

        let mut count = self.count.round() as i64;
        if self.jitter
            && self
                .actuator
                .map_or(false, |actuator| self.state.power(actuator) != 0)
        {
            count += self.rng.gen_range(0..=1);
        }

        Some((self.address, MetricValue::Count(count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_rejects_degenerate_resolution() {
        let state = Arc::new(SimState::new(76.0, 16.0));
        let mut encoder = VirtualEncoder::new(state, Some(1), RIGHT_ADDR, 0.0, false);

        assert!(encoder.probe().await.is_err());
    }

    #[tokio::test]
    async fn test_static_wheel_never_counts() {
        let state = Arc::new(SimState::new(76.0, 16.0));
        state.set_power(1, 127);

        let mut encoder = VirtualEncoder::new(state, None, BACK_ADDR, 100.0, false);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        match encoder.next().await {
            Some((address, MetricValue::Count(count))) => {
                assert_eq!(address, BACK_ADDR);
                assert_eq!(count, 0);
            }
            _ => panic!("expected a count"),
        }
    }

    #[tokio::test]
    async fn test_driven_wheel_counts() {
        let state = Arc::new(SimState::new(100.0, 16.0));
        state.set_power(1, 127);

        let mut encoder = VirtualEncoder::new(state, Some(1), RIGHT_ADDR, 10.0, false);
        encoder.reset();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        match encoder.next().await {
            Some((_, MetricValue::Count(count))) => {
                assert!(count > 0, "wheel at full power must count up");
            }
            _ => panic!("expected a count"),
        }
    }
}
