mod error;

use rovax_core::{metric::MetricValue, motion::Motion};

pub use error::{DeviceError, ErrorKind, Result};

pub type DeviceDescriptor<T> = std::sync::Arc<tokio::sync::Mutex<T>>;

/// Device trait.
#[async_trait::async_trait]
pub trait Device: Send {
    /// Return the device name.
    fn name(&self) -> String;

    /// Probe the device.
    ///
    /// Can be used to signal that the device is ready.
    /// Implementation is optional.
    async fn probe(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Device which can exercise motion.
#[async_trait::async_trait]
pub trait MotionDevice: Device {
    /// Issue actuate command.
    async fn actuate(&mut self, motion: Motion);

    /// Halt all operation.
    ///
    /// Instruct all motion to stop. A device does not have to
    /// implement the halt method. This method should be called
    /// in rare occasions, for example in an emergency.
    async fn halt(&mut self) {}
}

/// Device which can read field metrics.
#[async_trait::async_trait]
pub trait MetricDevice: Device {
    /// Return the next metric value and the device address from which the
    /// measurement originated. The device address may be used by the operand
    /// to map to a known machine component.
    async fn next(&mut self) -> Option<(u16, MetricValue)>;
}

/// Create and initialize a device.
///
/// This function will return a shared handle to the device.
/// This is the recommended way to instantiate devices.
pub(crate) async fn probe_device<D: Device>(mut device: D) -> Result<DeviceDescriptor<D>> {
    device.probe().await?;

    info!("Device '{}' is online", device.name());

    Ok(std::sync::Arc::new(tokio::sync::Mutex::new(device)))
}
