pub mod algorithm;
pub mod angle;
pub mod geometry;
pub mod metric;
pub mod motion;
pub mod position;
pub mod route;

pub use nalgebra;

pub trait Identity {
    /// Introduction message.
    ///
    /// Returns a string to introduce the object for the first time and
    /// should only be called once.
    fn intro() -> String;
}

/// Record writer for tracing instances.
pub trait TraceWriter {
    /// Write a single record to the tracing instance.
    fn write_record<T: serde::Serialize>(&mut self, record: T);
}

/// Any object that can write itself to a trace writer.
pub trait Trace<T: TraceWriter> {
    /// Record the object onto the writer.
    ///
    /// The timestamp is relative to the start of the tracing
    /// session. How the object is layed out in the record is
    /// left to the implementation.
    fn record(&self, writer: &mut T, timestamp: std::time::Duration);
}

/// Tracers spawn trace writer instances on request.
pub trait Tracer {
    type Instance: TraceWriter + Send;

    /// Construct the tracer from a filesystem path.
    fn from_path<P: AsRef<std::path::Path>>(path: P) -> Self;

    /// Spawn a new named tracing instance.
    fn instance(&self, name: &str) -> Self::Instance;
}
