/// Measurement taken from a metric device.
///
/// Devices decide which of the values they produce and at what
/// rate. Consumers must check the device id to know what the
/// value describes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    /// Cumulative pulse count from a quadrature encoder.
    Count(i64),
    /// Absolute heading in radians.
    Heading(f64),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Count(value) => write!(f, "Count: {:>8}", value),
            MetricValue::Heading(value) => write!(f, "Heading: {:.3}rad", value),
        }
    }
}
